// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Concurrent first-time resolution and parallel (de)serialize calls over
//! shared strategies.

use std::collections::HashMap;
use std::sync::Arc;

use protean::prelude::{RecordingSink, ReplaySource};
use protean::Protean;

#[test]
fn concurrent_first_resolution_publishes_one_entry() {
    let engine = Protean::default();
    let token = engine.token_of::<Vec<i64>>().unwrap();

    let strategies = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| engine.resolve_ser(token).unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    // Every caller obtained a working strategy, and it is the same one.
    for strategy in &strategies[1..] {
        assert!(Arc::ptr_eq(&strategies[0], strategy));
    }
    // Vec<i64> plus its element descriptor.
    assert_eq!(engine.ser_cache().resolved_count(), 2);
}

#[test]
fn resolved_strategies_serve_parallel_calls() {
    let engine = Protean::default();
    let mut scores: HashMap<String, i64> = HashMap::new();
    scores.insert("a".to_string(), 1);
    scores.insert("b".to_string(), 2);

    // Resolve once up front, then hammer from many threads.
    let mut warmup = RecordingSink::new();
    engine.serialize(&scores, &mut warmup).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let scores = &scores;
            let engine = &engine;
            scope.spawn(move || {
                for _ in 0..50 {
                    let mut sink = RecordingSink::new();
                    engine.serialize(scores, &mut sink).unwrap();
                    let mut source = ReplaySource::new(sink.into_events());
                    let back: HashMap<String, i64> = engine.deserialize(&mut source).unwrap();
                    assert_eq!(&back, scores);
                }
            });
        }
    });
}
