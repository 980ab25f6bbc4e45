use proptest::prelude::*;

use llmrec::recommender::{
    Budget, Context, DatasetSize, Domain, FEATURE_DIM, FeatureEncoder, OneHotEncoder, Task,
};

fn label(vocab: &'static [&'static str]) -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vocab).prop_map(str::to_string),
        "[a-z_]{1,12}",
    ]
}

prop_compose! {
    fn arb_context()(
        task in label(Task::VOCAB),
        domain in label(Domain::VOCAB),
        dataset_size in label(DatasetSize::VOCAB),
        latency in label(Budget::VOCAB),
        cost in label(Budget::VOCAB),
        flags in prop::array::uniform4(any::<bool>()),
    ) -> Context {
        Context {
            task: task.into(),
            domain: domain.into(),
            dataset_size: dataset_size.into(),
            latency_budget: latency.into(),
            cost_budget: cost.into(),
            multilingual: flags[0],
            needs_coding: flags[1],
            needs_reasoning: flags[2],
            safety_sensitive: flags[3],
        }
    }
}

proptest! {
    #[test]
    fn encoding_is_deterministic(ctx in arb_context()) {
        prop_assert_eq!(OneHotEncoder.encode(&ctx), OneHotEncoder.encode(&ctx));
    }

    #[test]
    fn encoding_is_binary_with_fixed_length(ctx in arb_context()) {
        let x = OneHotEncoder.encode(&ctx);
        prop_assert_eq!(x.len(), FEATURE_DIM);
        prop_assert!(x.iter().all(|v| *v == 0.0 || *v == 1.0));
    }

    #[test]
    fn one_active_slot_per_known_category(ctx in arb_context()) {
        let x = OneHotEncoder.encode(&ctx);
        let known = [
            ctx.task.slot().is_some(),
            ctx.domain.slot().is_some(),
            ctx.dataset_size.slot().is_some(),
            ctx.latency_budget.slot().is_some(),
            ctx.cost_budget.slot().is_some(),
        ]
        .iter()
        .filter(|k| **k)
        .count();
        let flags = [ctx.multilingual, ctx.needs_coding, ctx.needs_reasoning, ctx.safety_sensitive]
            .iter()
            .filter(|f| **f)
            .count();
        let ones = x.iter().filter(|v| **v == 1.0).count();
        prop_assert_eq!(ones, known + flags);
    }
}
