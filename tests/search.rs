//! Integration tests for the search_parts tool against a fixture catalogue.
//!
//! Requests are built from JSON the way an MCP client sends them.

mod common;

use common::{lcsc_numbers, TestEnv, PART_COUNT};
use jlcparts_mcp::tools::{execute_search_parts, SearchOutput, SearchPartsInput};
use serde_json::json;

fn search(env: &TestEnv, args: serde_json::Value) -> jlcparts_mcp::Result<SearchOutput> {
    let input: SearchPartsInput = serde_json::from_value(args).expect("valid tool arguments");
    execute_search_parts(&env.parts, input)
}

// ============================================================================
// Worked examples
// ============================================================================

#[test]
fn test_keyword_with_min_stock_first_page() {
    let env = TestEnv::new();
    let out = search(&env, json!({"keyword": "0603", "min_stock": 100, "limit": 5})).unwrap();

    assert_eq!(
        lcsc_numbers(&out.parts),
        ["C1591", "C25804", "C21190", "C1015", "C1017"]
    );
    assert_eq!(out.total_returned, 5);
    assert!(out.has_more);
    assert_eq!(out.next_offset, Some(5));

    for part in &out.parts {
        let stock: i64 = part.stock.parse().unwrap();
        assert!(stock >= 100);
        assert!(
            part.mfr_part.contains("0603") || part.description.contains("0603"),
            "{part:?}"
        );
    }
}

#[test]
fn test_keyword_second_page() {
    let env = TestEnv::new();
    let out = search(
        &env,
        json!({"keyword": "0603", "min_stock": 100, "limit": 5, "offset": 5}),
    )
    .unwrap();

    assert_eq!(lcsc_numbers(&out.parts), ["C14663"]);
    assert!(!out.has_more);
    assert_eq!(out.next_offset, None);
}

#[test]
fn test_category_name_with_basic_parts() {
    let env = TestEnv::new();
    let out = search(
        &env,
        json!({"category": "Ferrite Bead", "part_type": "basic", "limit": 10}),
    )
    .unwrap();

    assert_eq!(lcsc_numbers(&out.parts), ["C1015", "C1017"]);
    for part in &out.parts {
        assert_eq!(part.part_type, "basic");
        assert_eq!(part.category, "Filters / Ferrite Beads");
    }
}

// ============================================================================
// Pagination
// ============================================================================

#[test]
fn test_result_never_exceeds_limit() {
    let env = TestEnv::new();
    for limit in [1, 2, 3, 7, 50] {
        let out = search(&env, json!({"limit": limit})).unwrap();
        assert!(out.parts.len() <= limit as usize);
        assert_eq!(out.parts.len(), (limit as usize).min(PART_COUNT as usize));
    }
}

#[test]
fn test_oversized_limit_is_clamped() {
    let env = TestEnv::new();
    let out = search(&env, json!({"limit": 500})).unwrap();
    assert_eq!(out.limit, 50);
    assert_eq!(out.total_returned, PART_COUNT as usize);
    assert!(!out.has_more);
}

#[test]
fn test_non_positive_limit_is_clamped_to_one() {
    let env = TestEnv::new();
    for limit in [-5, 0] {
        let out = search(&env, json!({"limit": limit})).unwrap();
        assert_eq!(out.limit, 1);
        assert_eq!(lcsc_numbers(&out.parts), ["C1591"]);
    }
}

#[test]
fn test_default_limit() {
    let env = TestEnv::new();
    let out = search(&env, json!({})).unwrap();
    assert_eq!(out.limit, 20);
    assert_eq!(out.offset, 0);
}

#[test]
fn test_negative_offset_rejected() {
    let env = TestEnv::new();
    let err = search(&env, json!({"offset": -1})).unwrap_err();
    assert_eq!(err.code(), "INVALID_REQUEST");
    assert!(err.to_string().contains("offset"));
}

#[test]
fn test_offset_past_end_is_empty() {
    let env = TestEnv::new();
    let out = search(&env, json!({"keyword": "0603", "offset": 1000})).unwrap();
    assert!(out.parts.is_empty());
    assert!(!out.has_more);
}

#[test]
fn test_pages_are_disjoint_and_cover_everything() {
    let env = TestEnv::new();
    let mut seen = Vec::new();
    let mut offset = 0;
    loop {
        let out = search(&env, json!({"limit": 3, "offset": offset})).unwrap();
        seen.extend(lcsc_numbers(&out.parts));
        match out.next_offset {
            Some(next) => offset = next,
            None => break,
        }
    }

    let all = search(&env, json!({"limit": 50})).unwrap();
    assert_eq!(seen, lcsc_numbers(&all.parts));
}

#[test]
fn test_non_numeric_limit_fails_to_deserialize() {
    let parsed = serde_json::from_value::<SearchPartsInput>(json!({"limit": "ten"}));
    assert!(parsed.is_err());
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_default_order_is_stock_then_lcsc() {
    let env = TestEnv::new();
    let out = search(&env, json!({"limit": 50})).unwrap();
    assert_eq!(
        lcsc_numbers(&out.parts),
        [
            "C1591", "C25804", "C21190", "C25744", "C1015", "C1017", "C14663", "C76992",
            "C123456", "C200000", "C99999"
        ]
    );
}

#[test]
fn test_identical_requests_are_deterministic() {
    let env = TestEnv::new();
    let args = json!({"keyword": "bead", "limit": 2});
    let first = search(&env, args.clone()).unwrap();
    let second = search(&env, args).unwrap();
    assert_eq!(first.parts, second.parts);
}

#[test]
fn test_price_order_puts_unknown_prices_last() {
    let env = TestEnv::new();
    let out = search(&env, json!({"sort": "price", "limit": 50})).unwrap();
    let numbers = lcsc_numbers(&out.parts);
    assert_eq!(&numbers[..3], ["C25744", "C21190", "C25804"]);
    assert_eq!(&numbers[9..], ["C123456", "C200000"]);
}

#[test]
fn test_lcsc_order() {
    let env = TestEnv::new();
    let out = search(&env, json!({"sort": "lcsc", "limit": 3})).unwrap();
    assert_eq!(lcsc_numbers(&out.parts), ["C1015", "C1017", "C1591"]);
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_keyword_is_case_insensitive() {
    let env = TestEnv::new();
    let lower = search(&env, json!({"keyword": "10k"})).unwrap();
    let upper = search(&env, json!({"keyword": "10K"})).unwrap();
    assert_eq!(lower.parts, upper.parts);
    assert_eq!(lcsc_numbers(&lower.parts), ["C25804", "C25744", "C14663"]);
}

#[test]
fn test_keyword_case_folding_is_ascii_only() {
    let env = TestEnv::new();
    let exact = search(&env, json!({"keyword": "10KΩ"})).unwrap();
    assert_eq!(lcsc_numbers(&exact.parts), ["C25804", "C25744", "C14663"]);

    // Ω and ω are different characters to SQLite LIKE
    let folded = search(&env, json!({"keyword": "10kω"})).unwrap();
    assert!(folded.parts.is_empty());
}

#[test]
fn test_keyword_percent_is_literal() {
    let env = TestEnv::new();
    let out = search(&env, json!({"keyword": "100%"})).unwrap();
    assert_eq!(lcsc_numbers(&out.parts), ["C200000"]);
}

#[test]
fn test_min_stock_and_max_price_combined() {
    let env = TestEnv::new();
    let out = search(&env, json!({"min_stock": 3500000, "max_price": 0.001})).unwrap();
    assert_eq!(lcsc_numbers(&out.parts), ["C21190"]);
}

#[test]
fn test_min_stock_and_max_price_are_inclusive() {
    let env = TestEnv::new();
    let out = search(&env, json!({"min_stock": 3000000, "max_price": 0.001})).unwrap();
    assert_eq!(lcsc_numbers(&out.parts), ["C21190", "C25744"]);
}

#[test]
fn test_max_price_skips_unparsable_prices() {
    let env = TestEnv::new();
    let out = search(&env, json!({"max_price": 1000.0, "limit": 50})).unwrap();
    let numbers = lcsc_numbers(&out.parts);
    assert_eq!(numbers.len(), 9);
    assert!(!numbers.contains(&"C123456".to_string()));
    assert!(!numbers.contains(&"C200000".to_string()));
}

#[test]
fn test_category_id_filter() {
    let env = TestEnv::new();
    let out = search(&env, json!({"category_id": 2})).unwrap();
    assert_eq!(lcsc_numbers(&out.parts), ["C1015", "C1017", "C76992"]);
}

#[test]
fn test_both_category_forms_rejected() {
    let env = TestEnv::new();
    let err = search(&env, json!({"category_id": 2, "category": "Ferrite"})).unwrap_err();
    assert_eq!(err.code(), "INVALID_REQUEST");
}

#[test]
fn test_extended_parts_only() {
    let env = TestEnv::new();
    let out = search(&env, json!({"category_id": 2, "part_type": "extended"})).unwrap();
    assert_eq!(lcsc_numbers(&out.parts), ["C76992"]);
}

#[test]
fn test_manufacturer_and_package_filters() {
    let env = TestEnv::new();
    let out = search(&env, json!({"manufacturer_id": 3, "package": "0603"})).unwrap();
    assert_eq!(lcsc_numbers(&out.parts), ["C1591", "C99999"]);
}

#[test]
fn test_like_patterns() {
    let env = TestEnv::new();
    let out = search(&env, json!({"manufacturer_pn": "CL10%"})).unwrap();
    assert_eq!(lcsc_numbers(&out.parts), ["C1591", "C99999"]);

    let out = search(&env, json!({"description": "%bead 600%"})).unwrap();
    assert_eq!(lcsc_numbers(&out.parts), ["C1017", "C76992"]);
}

#[test]
fn test_preferred_filter() {
    let env = TestEnv::new();
    let out = search(&env, json!({"preferred": true})).unwrap();
    assert_eq!(lcsc_numbers(&out.parts), ["C1015"]);
    assert_eq!(out.parts[0].preferred, "yes");
}

#[test]
fn test_negative_min_stock_rejected() {
    let env = TestEnv::new();
    let err = search(&env, json!({"min_stock": -1})).unwrap_err();
    assert_eq!(err.code(), "INVALID_REQUEST");
}

#[test]
fn test_hostile_keyword_is_plain_data() {
    let env = TestEnv::new();
    let out = search(&env, json!({"keyword": "'; DROP TABLE components; --"})).unwrap();
    assert!(out.parts.is_empty());

    let counts = env.catalogue.counts().unwrap();
    assert_eq!(counts.parts, PART_COUNT);
}

#[test]
fn test_blank_keyword_is_ignored() {
    let env = TestEnv::new();
    let out = search(&env, json!({"keyword": "   ", "limit": 50})).unwrap();
    assert_eq!(out.total_returned, PART_COUNT as usize);
}

// ============================================================================
// Totals and attributes
// ============================================================================

#[test]
fn test_include_total() {
    let env = TestEnv::new();
    let out = search(
        &env,
        json!({"keyword": "0603", "min_stock": 100, "limit": 5, "include_total": true}),
    )
    .unwrap();
    assert_eq!(out.total, Some(6));

    let out = search(&env, json!({"keyword": "0603"})).unwrap();
    assert_eq!(out.total, None);
}

#[test]
fn test_attributes_toggle() {
    let env = TestEnv::new();
    let out = search(&env, json!({"keyword": "0603WAF1002"})).unwrap();
    assert_eq!(
        out.parts[0].attributes.as_deref(),
        Some("Power(Watts): 100mW; Resistance: 10kΩ; Tolerance: ±1%")
    );

    let out = search(
        &env,
        json!({"keyword": "0603WAF1002", "include_attributes": false}),
    )
    .unwrap();
    assert_eq!(out.parts[0].attributes, None);

    let json = serde_json::to_string(&out).unwrap();
    assert!(!json.contains("attributes"));
}

#[test]
fn test_missing_values_render_unknown() {
    let env = TestEnv::new();
    let out = search(&env, json!({"keyword": "MYSTERY"})).unwrap();
    let part = &out.parts[0];
    assert_eq!(part.lcsc, "C123456");
    assert_eq!(part.stock, "10");
    assert_eq!(part.manufacturer, "unknown");
    assert_eq!(part.description, "unknown");
    assert_eq!(part.package, "unknown");
    assert_eq!(part.category, "unknown");
    assert_eq!(part.price, "unknown");
    assert_eq!(part.price_breaks, "unknown");
    assert_eq!(part.attributes.as_deref(), Some("unknown"));
}
