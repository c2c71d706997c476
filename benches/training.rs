use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fraud_claims::config::TrainingConfig;
use fraud_claims::inference::Predictor;
use fraud_claims::preprocessing::prepare_features;
use fraud_claims::training::{FraudPipeline, ModelKind};
use polars::prelude::*;
use rand::prelude::*;
use serde_json::json;

fn create_claims_data(n_rows: usize, rng: &mut StdRng) -> DataFrame {
    let mut amount = Vec::with_capacity(n_rows);
    let mut age = Vec::with_capacity(n_rows);
    let mut suspicious = Vec::with_capacity(n_rows);
    let mut region = Vec::with_capacity(n_rows);
    let mut label = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        let fraud = rng.gen::<f64>() < 0.2;
        amount.push((if fraud { 5000.0 } else { 500.0 }) + rng.gen::<f64>() * 3000.0);
        age.push(18.0 + rng.gen::<f64>() * 60.0);
        suspicious.push(if fraud ^ (rng.gen::<f64>() < 0.1) { "Y" } else { "N" });
        region.push(["north", "south", "east", "west"][rng.gen_range(0..4)]);
        label.push(if fraud { "TRUE" } else { "FALSE" });
    }

    df!(
        "Claim_Amount" => &amount,
        "Customer_Age" => &age,
        "Is_Suspicious" => &suspicious,
        "Region" => &region,
        "Is_Fraudulent" => &label
    )
    .unwrap()
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10); // Fewer samples for training benchmarks

    let mut rng = StdRng::seed_from_u64(42);
    let config = TrainingConfig::new().with_n_estimators(50);

    for n_rows in [1000, 5000].iter() {
        let df = create_claims_data(*n_rows, &mut rng);
        let data = prepare_features(&df, &df, "Is_Fraudulent").unwrap();

        for kind in ModelKind::ALL {
            group.bench_with_input(
                BenchmarkId::new(kind.to_string(), n_rows),
                &data,
                |b, data| {
                    b.iter(|| {
                        FraudPipeline::fit(
                            kind,
                            &data.preprocessor,
                            black_box(&data.x_train),
                            &data.y_train,
                            &config,
                        )
                        .unwrap()
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    // Train model once
    let mut rng = StdRng::seed_from_u64(7);
    let df = create_claims_data(5000, &mut rng);
    let data = prepare_features(&df, &df, "Is_Fraudulent").unwrap();
    let pipeline = FraudPipeline::fit(
        ModelKind::RandomForest,
        &data.preprocessor,
        &data.x_train,
        &data.y_train,
        &TrainingConfig::new().with_n_estimators(100),
    )
    .unwrap();
    let predictor = Predictor::new(pipeline);

    let record = json!({"Claim_Amount": 6200.0, "Is_Suspicious": "Y", "Region": "east"});
    let record = record.as_object().unwrap().clone();
    group.bench_function("single_record", |b| {
        b.iter(|| predictor.predict_record(black_box(&record)).unwrap())
    });

    for n_rows in [100, 1000, 10000].iter() {
        let batch = create_claims_data(*n_rows, &mut rng).drop("Is_Fraudulent").unwrap();

        group.bench_with_input(BenchmarkId::new("frame", n_rows), &batch, |b, df| {
            b.iter(|| predictor.predict_frame(black_box(df)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
