// 该文件是 Guoxian （果鲜） 项目的一部分。
// tests/classifier_test.rs - 分类器测试
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

mod common;

use common::MockLoader;
use guoxian::{
  bitmap::{Bitmap, pack_argb},
  frame::ScaleFilter,
  input::{Capture, CaptureOptions},
  model::{
    Classification, ClassifierError, FreshnessClassifier, LabelTable, Model, OUT_OF_BOUNDS_TEXT,
  },
};

fn classifier(loader: MockLoader) -> FreshnessClassifier<MockLoader> {
  FreshnessClassifier::new(loader, LabelTable::default()).unwrap()
}

fn red_capture() -> Capture<224, 224> {
  let bitmap = Bitmap::filled(300, 200, pack_argb(255, 255, 0, 0));
  Capture::from_bitmap("red.png", &bitmap, &CaptureOptions::default()).unwrap()
}

#[test]
fn picks_the_highest_confidence_label() {
  let loader = MockLoader::new(vec![0.1, 0.9, 0.05, 0.05, 0.05, 0.05]);
  let counters = loader.counters();
  let classifier = classifier(loader);

  let result = classifier.infer(&red_capture()).unwrap();
  assert_eq!(result.classification.index(), Some(1));
  assert_eq!(result.classification.text(), "Fresh Banana");
  assert_eq!(result.scores.len(), 6);

  // 构造时一次，推理时一次
  assert_eq!(counters.loads(), 2);
  assert_eq!(counters.releases(), 2);
}

#[test]
fn ties_resolve_to_first_label() {
  let classifier = classifier(MockLoader::new(vec![0.5, 0.5, 0.0, 0.0, 0.0, 0.0]));
  let result = classifier.infer(&red_capture()).unwrap();
  assert_eq!(result.classification.label(), Some("Fresh Apple"));
}

#[test]
fn model_is_loaded_and_released_per_call() {
  let loader = MockLoader::new(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
  let counters = loader.counters();
  let classifier = classifier(loader);

  for _ in 0..3 {
    let result = classifier.infer(&red_capture()).unwrap();
    assert_eq!(result.classification.text(), "Rotten Orange");
  }
  assert_eq!(counters.loads(), 4);
  assert_eq!(counters.releases(), 4);
  assert_eq!(counters.runs(), 3);
}

#[test]
fn empty_output_is_a_diagnostic_and_still_releases() {
  let loader = MockLoader::new(vec![]).output_len(None);
  let counters = loader.counters();
  let classifier = classifier(loader);

  let result = classifier.infer(&red_capture()).unwrap();
  assert_eq!(result.classification, Classification::NoOutput);
  assert_eq!(result.classification.text(), "No output from model");
  assert_eq!(counters.loads(), counters.releases());
}

#[test]
fn winner_beyond_label_table_is_out_of_bounds() {
  let mut scores = vec![0.1; 8];
  scores[6] = 0.8;
  let classifier = classifier(MockLoader::new(scores).output_len(None));

  let result = classifier.infer(&red_capture()).unwrap();
  assert_eq!(
    result.classification,
    Classification::IndexOutOfBounds {
      index: 6,
      score: 0.8
    }
  );
  assert_eq!(result.classification.text(), OUT_OF_BOUNDS_TEXT);
}

#[test]
fn label_table_mismatch_is_rejected_eagerly() {
  let loader = MockLoader::new(vec![0.0; 5]);
  let counters = loader.counters();

  let err = FreshnessClassifier::new(loader, LabelTable::default())
    .err()
    .unwrap();
  assert!(matches!(
    err,
    ClassifierError::LabelMismatch {
      labels: 6,
      outputs: 5
    }
  ));
  assert_eq!(counters.releases(), 1);
}

#[test]
fn custom_label_table_is_used() {
  let labels = LabelTable::parse("Ripe Pear\nRotten Pear\n").unwrap();
  let classifier: FreshnessClassifier<_> =
    FreshnessClassifier::new(MockLoader::new(vec![0.2, 0.7]), labels).unwrap();

  let result = classifier.infer(&red_capture()).unwrap();
  assert_eq!(result.classification.label(), Some("Rotten Pear"));
}

#[test]
fn load_failure_aborts_without_release() {
  // 第 2 次加载（第一次推理）失败
  let loader = MockLoader::new(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]).fail_loads(&[2]);
  let counters = loader.counters();
  let classifier = classifier(loader);

  let err = classifier.infer(&red_capture()).unwrap_err();
  assert!(matches!(err, ClassifierError::LoadError(_)));
  assert_eq!(counters.loads(), 2);
  assert_eq!(counters.releases(), 1);
  assert_eq!(counters.runs(), 0);

  // 下一次调用不受影响
  let result = classifier.infer(&red_capture()).unwrap();
  assert_eq!(result.classification.label(), Some("Fresh Apple"));
  assert_eq!(counters.releases(), 2);
}

#[test]
fn load_failure_at_construction_is_reported() {
  let loader = MockLoader::new(vec![0.0; 6]).fail_loads(&[1]);
  let counters = loader.counters();

  let result = FreshnessClassifier::new(loader, LabelTable::default());
  assert!(matches!(result, Err(ClassifierError::LoadError(_))));
  assert_eq!(counters.releases(), 0);
}

#[test]
fn inference_failure_still_releases() {
  let loader = MockLoader::new(vec![0.0; 6]).fail_runs();
  let counters = loader.counters();
  let classifier = classifier(loader);

  let err = classifier.infer(&red_capture()).unwrap_err();
  assert!(matches!(err, ClassifierError::InferenceError(_)));
  assert_eq!(counters.loads(), 2);
  assert_eq!(counters.releases(), 2);
}

#[test]
fn session_receives_nhwc_u8_tensor() {
  let loader = MockLoader::new(vec![0.0; 6]);
  let counters = loader.counters();
  let classifier = classifier(loader);

  let bitmap = Bitmap::filled(640, 480, pack_argb(255, 255, 0, 0));
  classifier
    .classify_bitmap(&bitmap, ScaleFilter::Nearest)
    .unwrap();

  let last = counters.last_input.lock().unwrap();
  let (input, shape) = last.as_ref().unwrap();
  assert_eq!(*shape, [1, 224, 224, 3]);
  assert_eq!(input.len(), 224 * 224 * 3);
  assert!(input.chunks_exact(3).all(|px| px == [255, 0, 0]));
}

#[test]
fn empty_bitmap_is_a_preprocess_error() {
  let loader = MockLoader::new(vec![0.0; 6]);
  let counters = loader.counters();
  let classifier = classifier(loader);

  let err = classifier
    .classify_bitmap(&Bitmap::filled(0, 0, 0), ScaleFilter::default())
    .unwrap_err();
  assert!(matches!(err, ClassifierError::PreprocessError(_)));
  assert_eq!(counters.runs(), 0);
}
