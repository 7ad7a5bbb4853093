//! End-to-end runs over a manifest fixture written to a temporary directory.

use celleq_core::CellEqError;
use celleq_eval::{run_experiment, ExperimentArgs, FailurePolicy};
use serde_json::json;
use std::fs;
use std::path::Path;

const WIDTH: usize = 8;

fn crops(label: i64, count: usize) -> Vec<serde_json::Value> {
    (0..count)
        .map(|i| {
            let row: Vec<f32> = (0..WIDTH).map(|x| ((x * (i + 1)) % 7) as f32).collect();
            json!({"label": label, "pixels": [row.clone(), row.clone(), row]})
        })
        .collect()
}

fn write_fixture(root: &Path, hierarchy_match: serde_json::Value) {
    let data = root.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(root.join("channels.txt"), "DNA\nCD45\nCD3\n").unwrap();

    let mut train = crops(0, 12);
    train.extend(crops(1, 4));
    train.extend(crops(-1, 3));
    fs::write(data.join("train.json"), serde_json::to_string(&train).unwrap()).unwrap();
    let mut val = crops(0, 3);
    val.extend(crops(1, 3));
    fs::write(data.join("val.json"), serde_json::to_string(&val).unwrap()).unwrap();

    let config = json!({
        "root_dir": data,
        "channels_path": root.join("channels.txt"),
        "crop_size": WIDTH,
        "train_set": ["train"],
        "val_set": ["val"],
        "to_pad": true,
        "blacklist": ["CD3"],
        "batch_size": 4,
        "num_workers": 2,
        "sample_batch": true,
        "num_classes": 2,
        "hierarchy_match": hierarchy_match,
        "size_data": 8,
        "crop_input_size": 6
    });
    fs::write(root.join("config.json"), config.to_string()).unwrap();
}

fn args(root: &Path) -> ExperimentArgs {
    ExperimentArgs {
        output_dir: root.join("out"),
        modelname: "tiny_mlp".to_string(),
        num_datapoints: 2,
        base_path: root.to_path_buf(),
        seed: Some(11),
        max_batches: 400,
        failure_policy: FailurePolicy::FailFast,
    }
}

#[test]
fn test_run_writes_one_row_per_dataset() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), serde_json::Value::Null);

    let path = run_experiment(&args(dir.path())).expect("run should succeed");
    assert_eq!(path, dir.path().join("out").join("tiny_mlp.csv"));

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        header,
        vec![
            "lee_trans",
            "lee_trans_std",
            "shift_err",
            "shift_err_std",
            "shift_flip",
            "shift_flip_std",
            "dataset",
            "model",
            "params"
        ]
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    let datasets: Vec<&str> = rows.iter().map(|r| &r[6]).collect();
    assert_eq!(datasets, vec!["train", "val", "train_eval"]);
    // 2 channels x 6 pixels -> 64 hidden -> 2 classes
    let params = (12 * 64 + 64) + (64 * 2 + 2);
    for row in &rows {
        assert_eq!(&row[7], "tiny_mlp");
        assert_eq!(row[8].parse::<usize>().unwrap(), params);
        assert!(row[0].parse::<f64>().unwrap().is_finite());
    }
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), serde_json::Value::Null);
    let first = fs::read_to_string(run_experiment(&args(dir.path())).unwrap()).unwrap();
    let second = fs::read_to_string(run_experiment(&args(dir.path())).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_category_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), json!({"0": "tumor"}));

    let err = run_experiment(&args(dir.path())).unwrap_err();
    assert_eq!(err, CellEqError::MissingCategory { label: 1 });
    assert!(!dir.path().join("out").join("tiny_mlp.csv").exists());
}

#[test]
fn test_missing_config_key_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), serde_json::Value::Null);
    let path = dir.path().join("config.json");
    let mut doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    doc.as_object_mut().unwrap().remove("sample_batch");
    fs::write(&path, doc.to_string()).unwrap();

    assert_eq!(
        run_experiment(&args(dir.path())).unwrap_err(),
        CellEqError::MissingConfigKey("sample_batch".into())
    );
}
