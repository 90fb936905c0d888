// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/model/classifier.rs - 新鲜度分类器
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

use std::marker::PhantomData;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
  bitmap::{Bitmap, BitmapError},
  frame::{RgbNhwcFrame, ScaleFilter},
  input::{AsNhwcFrame, Capture},
  model::{
    ClassifyResult, INPUT_H, INPUT_W, LabelTable, LabelTableError, Model,
    session::{ModelLoader, ScopedModel, Session},
  },
};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum ClassifierError {
  #[error("模型加载失败: {0}")]
  LoadError(#[source] BoxError),
  #[error("模型推理失败: {0}")]
  InferenceError(#[source] BoxError),
  #[error("标签表长度 {labels} 与模型输出长度 {outputs} 不一致")]
  LabelMismatch { labels: usize, outputs: usize },
  #[error("图像预处理失败: {0}")]
  PreprocessError(#[from] BitmapError),
  #[error("标签表错误: {0}")]
  LabelError(#[from] LabelTableError),
}

/// 每次推理都重新加载模型，推理结束立即释放
pub struct Classifier<L, Frame, const W: u32, const H: u32> {
  loader: L,
  labels: LabelTable,
  _phantom: PhantomData<Frame>,
}

pub type FreshnessClassifier<L> = Classifier<L, Capture<INPUT_W, INPUT_H>, INPUT_W, INPUT_H>;

impl<L: ModelLoader, Frame, const W: u32, const H: u32> Classifier<L, Frame, W, H> {
  /// 创建分类器，并立即检查标签表与模型输出长度是否一致
  pub fn new(loader: L, labels: LabelTable) -> Result<Self, ClassifierError> {
    {
      let model = ScopedModel::acquire(&loader).map_err(|e| ClassifierError::LoadError(e.into()))?;
      match model.output_len() {
        Some(outputs) if outputs != labels.len() => {
          error!(
            "标签表长度 {} 与模型输出长度 {} 不一致",
            labels.len(),
            outputs
          );
          return Err(ClassifierError::LabelMismatch {
            labels: labels.len(),
            outputs,
          });
        }
        Some(outputs) => debug!("模型输出长度: {}", outputs),
        None => debug!("模型输出形状不确定，跳过标签表检查"),
      }
    }

    info!("分类器就绪，共 {} 个类别", labels.len());
    Ok(Classifier {
      loader,
      labels,
      _phantom: PhantomData,
    })
  }

  pub fn labels(&self) -> &LabelTable {
    &self.labels
  }

  /// 对已预处理的 NHWC 数据执行一次分类
  pub fn classify_nhwc(&self, data: &[u8]) -> Result<ClassifyResult, ClassifierError> {
    let mut model =
      ScopedModel::acquire(&self.loader).map_err(|e| ClassifierError::LoadError(e.into()))?;

    let now = std::time::Instant::now();
    let scores = model
      .run(data, RgbNhwcFrame::<W, H>::SHAPE)
      .map_err(|e| ClassifierError::InferenceError(e.into()))?;
    debug!("推理耗时: {:.2?}, 输出: {:?}", now.elapsed(), scores);

    Ok(ClassifyResult::new(scores, &self.labels))
  }

  /// 位图到标签（或诊断信息）的完整流程
  pub fn classify_bitmap(
    &self,
    bitmap: &Bitmap,
    filter: ScaleFilter,
  ) -> Result<ClassifyResult, ClassifierError> {
    let frame = RgbNhwcFrame::<W, H>::from_bitmap(bitmap, filter)?;
    self.classify_nhwc(frame.as_nhwc())
  }
}

impl<L: ModelLoader, Frame: AsNhwcFrame<W, H>, const W: u32, const H: u32> Model
  for Classifier<L, Frame, W, H>
{
  type Input = Frame;
  type Output = ClassifyResult;
  type Error = ClassifierError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    self.classify_nhwc(input.as_nhwc())
  }
}
