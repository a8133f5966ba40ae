//! Fuzz target: `ForestClassifier::from_json_slice`
//!
//! Feeds arbitrary bytes to the model artifact parser.  Anything that
//! passes load-time validation must then evaluate without panicking, so
//! a malformed file can only ever fail startup, never a cycle.
//!
//! cargo fuzz run fuzz_model_artifact

#![no_main]

use greenhouse::decision::classifier::Classifier;
use greenhouse::decision::forest::ForestClassifier;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(model) = ForestClassifier::from_json_slice(data) else {
        return;
    };

    let arity = model.input_arity();
    let probes = [0.0f32, -1.0e9, 1.0e9, 31.0];
    for probe in probes {
        let features = vec![probe; arity];
        let prediction = model
            .predict(&features)
            .expect("validated model must evaluate finite input");
        assert_eq!(prediction.len(), model.artifact().heads.len());
    }

    let _ = model.predict(&[f32::NAN]);
    let _ = model.predict(&[]);
});
