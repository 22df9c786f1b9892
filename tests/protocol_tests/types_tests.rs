//! Types Tests
//!
//! Tests for the value types carried in requests and responses.

use waddlemap::correlator::RequestId;
use waddlemap::protocol::{decode_response, encode_response, Response, ResponseResult};
use waddlemap::{BlockData, DistanceMetric, KeywordMode};

// =============================================================================
// BlockData Equality Tests
// =============================================================================

#[test]
fn test_keyword_order_does_not_matter() {
    let a = BlockData::new("x").with_vector(vec![1.0, 2.0]).with_keywords(["a", "b"]);
    let b = BlockData::new("x").with_vector(vec![1.0, 2.0]).with_keywords(["b", "a"]);
    assert_eq!(a, b);
}

#[test]
fn test_keyword_set_membership_matters() {
    let a = BlockData::new("x").with_keywords(["a", "b"]);
    let b = BlockData::new("x").with_keywords(["a", "c"]);
    assert_ne!(a, b);
    assert_ne!(a, BlockData::new("x").with_keywords(["a"]));
}

#[test]
fn test_content_and_vector_still_compared() {
    let base = BlockData::new("x").with_vector(vec![1.0]);
    assert_ne!(base, BlockData::new("y").with_vector(vec![1.0]));
    assert_ne!(base, BlockData::new("x").with_vector(vec![2.0]));
    assert_ne!(base, BlockData::new("x"));
}

#[test]
fn test_responses_compare_blocks_as_sets() {
    let sent = Response::ok(
        RequestId::NIL,
        Some(ResponseResult::Block(BlockData::new("p").with_keywords(["hr", "policy"]))),
    );
    let decoded = decode_response(&encode_response(&sent).unwrap()).unwrap();
    let reordered = Response::ok(
        RequestId::NIL,
        Some(ResponseResult::Block(BlockData::new("p").with_keywords(["policy", "hr"]))),
    );
    assert_eq!(decoded, reordered);
}

// =============================================================================
// Parsing Tests
// =============================================================================

#[test]
fn test_parse_metric_and_mode() {
    assert_eq!("cosine".parse::<DistanceMetric>().unwrap(), DistanceMetric::Cosine);
    assert_eq!("L2".parse::<DistanceMetric>().unwrap(), DistanceMetric::L2);
    assert!("manhattan".parse::<DistanceMetric>().is_err());

    assert_eq!("prefix".parse::<KeywordMode>().unwrap(), KeywordMode::Prefix);
    assert_eq!(
        "levenshtein".parse::<KeywordMode>().unwrap(),
        KeywordMode::Levenshtein { max_distance: 2 }
    );
    assert_eq!(
        "levenshtein:1".parse::<KeywordMode>().unwrap(),
        KeywordMode::Levenshtein { max_distance: 1 }
    );
    assert!("levenshtein:x".parse::<KeywordMode>().is_err());
}
