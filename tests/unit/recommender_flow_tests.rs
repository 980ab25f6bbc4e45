use std::sync::Arc;

use llmrec::RecError;
use llmrec::recommender::{
    ActionCatalog, Budget, Context, ContextSampler, FEATURE_DIM, FeatureEncoder, HeuristicRewarder,
    JsonFileStore, LinUcb, ModelCatalog, OneHotEncoder, PolicyConfig, PolicyStore, Recommender,
    Task, TrainOptions, train,
};
use llmrec::test_utils::fixtures::{SAMPLE_CATALOG_YAML, UnitTestFixture};

#[test]
fn trained_policy_round_trips_through_file_store() {
    let fixture = UnitTestFixture::new();
    let catalog = ModelCatalog::from_yaml(SAMPLE_CATALOG_YAML).unwrap();
    let mut engine = LinUcb::new(PolicyConfig {
        alpha: 1.0,
        d: FEATURE_DIM,
        n_actions: catalog.count(),
    })
    .unwrap();
    let mut rewards = HeuristicRewarder::new(catalog.clone(), 0.05, Some(11)).unwrap();
    let report = train(
        &mut engine,
        &OneHotEncoder,
        &mut rewards,
        &mut ContextSampler::new(Some(11)),
        TrainOptions {
            steps: 300,
            log_every: 0,
        },
    )
    .unwrap();
    assert_eq!(report.pulls.len(), 6);

    let store = JsonFileStore::new(fixture.policy_path());
    store.save(&engine.export()).unwrap();
    let reloaded = LinUcb::import(&store.load().unwrap().unwrap()).unwrap();

    let x = OneHotEncoder.encode(&Context::default());
    let before = engine.score(&x).unwrap();
    let after = reloaded.score(&x).unwrap();
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.action, b.action);
        assert!((a.total - b.total).abs() < 1e-12);
    }
}

#[test]
fn recommender_refuses_policy_for_different_catalog() {
    let fixture = UnitTestFixture::new();
    let store = Arc::new(JsonFileStore::new(fixture.policy_path()));
    let small = LinUcb::new(PolicyConfig {
        alpha: 1.0,
        d: FEATURE_DIM,
        n_actions: 2,
    })
    .unwrap();
    store.save(&small.export()).unwrap();

    let catalog = Arc::new(ModelCatalog::from_yaml(SAMPLE_CATALOG_YAML).unwrap());
    let err = Recommender::open(catalog, Arc::new(OneHotEncoder), store, 1.0).unwrap_err();
    assert!(matches!(err, RecError::MalformedState(_)));
}

#[test]
fn feedback_is_durable_across_instances() {
    let fixture = UnitTestFixture::new();
    let open = || {
        Recommender::open(
            Arc::new(ModelCatalog::from_yaml(SAMPLE_CATALOG_YAML).unwrap()),
            Arc::new(OneHotEncoder),
            Arc::new(JsonFileStore::new(fixture.policy_path())),
            0.1,
        )
        .unwrap()
    };
    let ctx = Context {
        task: Task::Code,
        cost_budget: Budget::Low,
        ..Context::default()
    };

    let first = open();
    first.feedback(&ctx, "qwen-2-5-coder", 1.0).unwrap();
    assert!(fixture.policy_path().is_file());

    let second = open();
    assert_eq!(second.snapshot(), first.snapshot());
    assert_eq!(second.recommend(&ctx, 1).unwrap()[0].model_id, "qwen-2-5-coder");
}
