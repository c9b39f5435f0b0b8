//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check key derivation and fetch bookkeeping over random
//! inputs.

use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::cache::{decode_key, derive_key, FetchCache, FetchRequest, NoParams};
use crate::error::CacheError;

// == Strategies ==
/// Generates logical keys (non-empty, arbitrary unicode)
fn key_strategy() -> impl Strategy<Value = String> {
    "\\PC{1,32}"
}

/// Generates small parameter maps
fn params_strategy() -> impl Strategy<Value = BTreeMap<String, i64>> {
    prop::collection::btree_map("[a-z]{1,4}", any::<i64>(), 0..4)
}

/// A fetch against one of a handful of keys, with or without a parameter
#[derive(Debug, Clone)]
struct FetchOp {
    key: String,
    param: Option<u8>,
}

fn fetch_op_strategy() -> impl Strategy<Value = FetchOp> {
    ("[a-c]", prop::option::of(0u8..3)).prop_map(|(key, param)| FetchOp { key, param })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Identical inputs always derive the identical key
    #[test]
    fn prop_derivation_deterministic(key in key_strategy(), params in params_strategy()) {
        let first = derive_key(&key, Some(&params)).unwrap();
        let second = derive_key(&key, Some(&params.clone())).unwrap();
        prop_assert_eq!(first, second);
    }

    // Distinct (key, params) pairs never share a derived key
    #[test]
    fn prop_derivation_injective(
        key_a in key_strategy(),
        params_a in prop::option::of(params_strategy()),
        key_b in key_strategy(),
        params_b in prop::option::of(params_strategy()),
    ) {
        let a = derive_key(&key_a, params_a.as_ref()).unwrap();
        let b = derive_key(&key_b, params_b.as_ref()).unwrap();

        if key_a == key_b && params_a == params_b {
            prop_assert_eq!(a, b);
        } else {
            prop_assert_ne!(a, b);
        }
    }

    // The derived key still carries the whole logical key
    #[test]
    fn prop_derivation_lossless(key in key_strategy()) {
        let derived = derive_key::<NoParams>(&key, None).unwrap();
        let record: serde_json::Value = serde_json::from_str(&decode_key(&derived).unwrap()).unwrap();
        prop_assert_eq!(record["key"].as_str(), Some(key.as_str()));
        prop_assert!(record.get("params").is_none());
    }

    // With a long TTL the callback runs once per distinct (key, param) pair,
    // and every other fetch is a hit
    #[test]
    fn prop_one_computation_per_derived_key(ops in prop::collection::vec(fetch_op_strategy(), 1..40)) {
        let cache = FetchCache::new();
        let calls = AtomicUsize::new(0);
        let mut distinct = HashSet::new();

        runtime().block_on(async {
            for op in &ops {
                let request = FetchRequest::new(&op.key).ttl_secs(3600);
                let value: Result<String, CacheError> = match &op.param {
                    Some(param) => {
                        cache
                            .fetch_sync(request.params(param), || {
                                calls.fetch_add(1, Ordering::SeqCst);
                                Ok(format!("{}:{}", op.key, param))
                            })
                            .await
                    }
                    None => {
                        cache
                            .fetch_sync(request, || {
                                calls.fetch_add(1, Ordering::SeqCst);
                                Ok(op.key.clone())
                            })
                            .await
                    }
                };

                let expected = match &op.param {
                    Some(param) => format!("{}:{}", op.key, param),
                    None => op.key.clone(),
                };
                assert_eq!(value.unwrap(), expected);
                distinct.insert((op.key.clone(), op.param));
            }
        });

        let stats = runtime().block_on(cache.stats());
        prop_assert_eq!(calls.load(Ordering::SeqCst), distinct.len());
        prop_assert_eq!(stats.misses as usize, distinct.len());
        prop_assert_eq!(stats.hits as usize, ops.len() - distinct.len());
        prop_assert_eq!(runtime().block_on(cache.size()), distinct.len());
    }
}
