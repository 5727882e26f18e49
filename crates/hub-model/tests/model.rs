//! Tests for hub-model types.

use chrono::{TimeZone, Utc};
use hub_model::{
    CorrectionEvent, EntityId, ForeignItem, MappingRecord, MappingType, MatchMethod, MatchResult,
    PartnerId, ReferenceEntity,
};

fn entity(id: &str, code: &str, description: &str) -> ReferenceEntity {
    ReferenceEntity::new(EntityId::new(id).unwrap(), code, description)
}

#[test]
fn entity_id_rejects_blank() {
    assert!(EntityId::new("").is_err());
    assert!(EntityId::new("   ").is_err());
    assert_eq!(EntityId::new("  42 ").unwrap().as_str(), "42");
}

#[test]
fn partner_id_rejects_blank() {
    assert!(PartnerId::new("\t").is_err());
    assert_eq!(PartnerId::new("acme").unwrap().as_str(), "acme");
}

#[test]
fn mapping_type_wire_names() {
    let json = serde_json::to_string(&MappingType::PaymentTerms).expect("serialize");
    assert_eq!(json, "\"paymentTerms\"");
    let round: MappingType = serde_json::from_str("\"deliveryTerms\"").expect("deserialize");
    assert_eq!(round, MappingType::DeliveryTerms);
    assert_eq!(MappingType::Unit.to_string(), "unit");
}

#[test]
fn match_method_wire_names() {
    let json = serde_json::to_string(&MatchMethod::Llm).expect("serialize");
    assert_eq!(json, "\"llm\"");
    let round: MatchMethod = serde_json::from_str("\"embedding\"").expect("deserialize");
    assert_eq!(round, MatchMethod::Embedding);
}

#[test]
fn foreign_item_requires_code() {
    assert!(ForeignItem::new("", "something").validate().is_err());
    assert!(ForeignItem::new("  ", "something").validate().is_err());
    assert!(ForeignItem::new("VE-100", "").validate().is_ok());
}

#[test]
fn match_result_none_invariants() {
    let result = MatchResult::none();
    assert!(result.matched.is_none());
    assert_eq!(result.confidence, 0);
    assert_eq!(result.method, MatchMethod::None);
    assert!(!result.is_match());
}

#[test]
fn match_result_clamps_confidence() {
    let result = MatchResult::new(
        entity("1", "KG", "Kilogram"),
        255,
        MatchMethod::Historical,
        "test",
    );
    assert_eq!(result.confidence, 100);
}

#[test]
fn mapping_record_round_trips() {
    let created = Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap();
    let record = MappingRecord {
        id: "m-1".to_string(),
        mapping_type: MappingType::Product,
        partner_id: PartnerId::new("partner-7").unwrap(),
        their_code: "VAN-EXT-001".to_string(),
        their_description: "Vanilla Extract Premium".to_string(),
        our_entity_id: EntityId::new("2").unwrap(),
        our_code: "VE-100".to_string(),
        our_description: "Vanilla Extract 100%".to_string(),
        confidence: 95,
        usage_count: 12,
        created_at: created,
        updated_at: created,
    };

    let json = serde_json::to_string(&record).expect("serialize record");
    assert!(json.contains("\"theirCode\":\"VAN-EXT-001\""));
    let round: MappingRecord = serde_json::from_str(&json).expect("deserialize record");
    assert_eq!(round, record);
}

#[test]
fn note_reuse_bumps_usage() {
    let created = Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
    let mut record = MappingRecord {
        id: "m-1".to_string(),
        mapping_type: MappingType::Unit,
        partner_id: PartnerId::new("partner-7").unwrap(),
        their_code: "KGS".to_string(),
        their_description: "Kilograms".to_string(),
        our_entity_id: EntityId::new("1").unwrap(),
        our_code: "KG".to_string(),
        our_description: "Kilogram".to_string(),
        confidence: 90,
        usage_count: 20,
        created_at: created,
        updated_at: created,
    };

    record.note_reuse(later);
    assert_eq!(record.usage_count, 21);
    assert_eq!(record.updated_at, later);
    assert_eq!(record.created_at, created);
}

#[test]
fn correction_event_round_trips() {
    let event = CorrectionEvent {
        mapping_type: MappingType::Product,
        their_code: "CIN-PWD-050".to_string(),
        their_description: "Cinnamon Powder 50 micron".to_string(),
        suggested_entity_id: Some(EntityId::new("3").unwrap()),
        suggested_method: MatchMethod::Fuzzy,
        confirmed_code: "CP-FINE".to_string(),
        user_id: "reviewer-1".to_string(),
    };

    let json = serde_json::to_string(&event).expect("serialize event");
    assert!(json.contains("\"confirmedCode\":\"CP-FINE\""));
    let round: CorrectionEvent = serde_json::from_str(&json).expect("deserialize event");
    assert_eq!(round, event);
}
