// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/model.rs - 模型
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

use std::{fmt, path::Path};

use thiserror::Error;

/// 模型输入宽度
pub const INPUT_W: u32 = 224;
/// 模型输入高度
pub const INPUT_H: u32 = 224;

pub const NO_OUTPUT_TEXT: &str = "No output from model";
pub const OUT_OF_BOUNDS_TEXT: &str = "Class index out of bounds";

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

pub trait WithLabel: Sized + fmt::Debug {
  fn to_label_str(&self) -> String;
  fn to_label_id(&self) -> u32;
  fn from_label_id(id: u32) -> Option<Self>;
}

/// 果蔬新鲜度类别，顺序与模型输出一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FreshnessLabel {
  FreshApple,
  FreshBanana,
  FreshOrange,
  RottenApple,
  RottenBanana,
  RottenOrange,
}

impl FreshnessLabel {
  pub const ALL: [FreshnessLabel; 6] = [
    FreshnessLabel::FreshApple,
    FreshnessLabel::FreshBanana,
    FreshnessLabel::FreshOrange,
    FreshnessLabel::RottenApple,
    FreshnessLabel::RottenBanana,
    FreshnessLabel::RottenOrange,
  ];
}

impl WithLabel for FreshnessLabel {
  fn to_label_str(&self) -> String {
    match self {
      FreshnessLabel::FreshApple => "Fresh Apple",
      FreshnessLabel::FreshBanana => "Fresh Banana",
      FreshnessLabel::FreshOrange => "Fresh Orange",
      FreshnessLabel::RottenApple => "Rotten Apple",
      FreshnessLabel::RottenBanana => "Rotten Banana",
      FreshnessLabel::RottenOrange => "Rotten Orange",
    }
    .to_string()
  }

  fn to_label_id(&self) -> u32 {
    *self as u32
  }

  fn from_label_id(id: u32) -> Option<Self> {
    Self::ALL.get(id as usize).copied()
  }
}

#[derive(Error, Debug)]
pub enum LabelTableError {
  #[error("标签文件读取错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("标签文件为空")]
  Empty,
}

/// 标签表：按下标与模型输出对齐
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
  labels: Box<[String]>,
}

impl Default for LabelTable {
  fn default() -> Self {
    Self::from_labels(&FreshnessLabel::ALL)
  }
}

impl LabelTable {
  pub fn from_labels<T: WithLabel>(labels: &[T]) -> Self {
    LabelTable {
      labels: labels.iter().map(WithLabel::to_label_str).collect(),
    }
  }

  /// 每行一个标签，忽略空行
  pub fn parse(text: &str) -> Result<Self, LabelTableError> {
    let labels = text
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .map(str::to_string)
      .collect::<Box<[_]>>();
    if labels.is_empty() {
      return Err(LabelTableError::Empty);
    }
    Ok(LabelTable { labels })
  }

  pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LabelTableError> {
    Self::parse(&std::fs::read_to_string(path)?)
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&str> {
    self.labels.get(index).map(String::as_str)
  }
}

/// 最大值下标；相等时取第一个（严格大于比较）
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
  let (&first, rest) = values.split_first()?;
  let mut max_pos = 0;
  let mut max_value = first;
  for (i, &value) in rest.iter().enumerate() {
    if value > max_value {
      max_value = value;
      max_pos = i + 1;
    }
  }
  Some((max_pos, max_value))
}

/// 单次分类的结论
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
  Label {
    index: usize,
    label: String,
    score: f32,
  },
  NoOutput,
  IndexOutOfBounds {
    index: usize,
    score: f32,
  },
}

impl Classification {
  pub fn from_confidences(confidences: &[f32], labels: &LabelTable) -> Self {
    let Some((index, score)) = argmax(confidences) else {
      return Classification::NoOutput;
    };

    match labels.get(index) {
      Some(label) => Classification::Label {
        index,
        label: label.to_string(),
        score,
      },
      None => Classification::IndexOutOfBounds { index, score },
    }
  }

  /// 展示给用户的文本：标签或诊断信息
  pub fn text(&self) -> &str {
    match self {
      Classification::Label { label, .. } => label.as_str(),
      Classification::NoOutput => NO_OUTPUT_TEXT,
      Classification::IndexOutOfBounds { .. } => OUT_OF_BOUNDS_TEXT,
    }
  }

  pub fn label(&self) -> Option<&str> {
    match self {
      Classification::Label { label, .. } => Some(label.as_str()),
      _ => None,
    }
  }

  pub fn index(&self) -> Option<usize> {
    match self {
      Classification::Label { index, .. } | Classification::IndexOutOfBounds { index, .. } => {
        Some(*index)
      }
      Classification::NoOutput => None,
    }
  }

  pub fn score(&self) -> Option<f32> {
    match self {
      Classification::Label { score, .. } | Classification::IndexOutOfBounds { score, .. } => {
        Some(*score)
      }
      Classification::NoOutput => None,
    }
  }
}

impl fmt::Display for Classification {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.text())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyResult {
  pub classification: Classification,
  pub scores: Box<[f32]>,
}

impl ClassifyResult {
  pub fn new(scores: Vec<f32>, labels: &LabelTable) -> Self {
    ClassifyResult {
      classification: Classification::from_confidences(&scores, labels),
      scores: scores.into_boxed_slice(),
    }
  }

  pub fn is_label(&self) -> bool {
    matches!(self.classification, Classification::Label { .. })
  }
}

mod classifier;
mod session;
#[cfg(feature = "model_tflite")]
mod tflite;

pub use self::classifier::{Classifier, ClassifierError, FreshnessClassifier};
pub use self::session::{ModelLoader, ScopedModel, Session};
#[cfg(feature = "model_tflite")]
pub use self::tflite::{TfliteLoader, TfliteModelBuilder, TfliteModelError, TfliteSession};
