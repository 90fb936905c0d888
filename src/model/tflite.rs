// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/model/tflite.rs - TFLite 模型加载与推理
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

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, error, info};
use tract_tflite::prelude::*;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, UrlPathError,
  model::{
    Classifier, ClassifierError, LabelTable, LabelTableError,
    session::{ModelLoader, Session},
  },
};

type TflitePlan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

#[derive(Error, Debug)]
pub enum TfliteModelError {
  #[error("模型加载错误: {0}")]
  ModelLoadError(#[from] std::io::Error),
  #[error("Tract 错误: {0}")]
  TractError(TractError),
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
  #[error("URI 路径错误: {0}")]
  PathError(#[from] UrlPathError),
  #[error("模型结构不支持: {0}")]
  ModelShapeError(String),
  #[error("URI 参数错误: {0}")]
  QueryError(String),
}

impl From<TractError> for TfliteModelError {
  fn from(e: TractError) -> Self {
    TfliteModelError::TractError(e)
  }
}

/// 从 `tflite:///path/model.tflite?labels=...&optimize=false` 构造
#[derive(Debug, Clone)]
pub struct TfliteModelBuilder {
  model_path: PathBuf,
  labels_path: Option<PathBuf>,
  optimize: bool,
}

impl FromUrlWithScheme for TfliteModelBuilder {
  const SCHEME: &'static str = "tflite";
}

impl FromUrl for TfliteModelBuilder {
  type Error = TfliteModelError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(TfliteModelError::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }
    if url.path().is_empty() || url.path() == "/" {
      return Err(TfliteModelError::ModelPathError("模型路径为空".to_string()));
    }

    let mut builder = TfliteModelBuilder::new(crate::url_file_path(url)?);
    for (k, v) in url.query_pairs() {
      match k.as_ref() {
        "labels" => builder.labels_path = Some(PathBuf::from(v.as_ref())),
        "optimize" => {
          builder.optimize = v
            .parse()
            .map_err(|_| TfliteModelError::QueryError(format!("optimize={}", v)))?
        }
        _ => {}
      }
    }
    Ok(builder)
  }
}

impl TfliteModelBuilder {
  pub fn new(model_path: impl Into<PathBuf>) -> Self {
    TfliteModelBuilder {
      model_path: model_path.into(),
      labels_path: None,
      optimize: true,
    }
  }

  pub fn label_table(&self) -> Result<LabelTable, LabelTableError> {
    match &self.labels_path {
      Some(path) => {
        info!("加载标签文件: {}", path.display());
        LabelTable::from_path(path)
      }
      None => Ok(LabelTable::default()),
    }
  }

  pub fn loader(&self) -> TfliteLoader {
    TfliteLoader {
      model_path: self.model_path.clone(),
      optimize: self.optimize,
    }
  }

  pub fn build<Frame, const W: u32, const H: u32>(
    self,
  ) -> Result<Classifier<TfliteLoader, Frame, W, H>, ClassifierError> {
    let labels = self.label_table()?;
    Classifier::new(self.loader(), labels)
  }
}

/// 每次 `load` 都从磁盘读取模型并生成执行计划
#[derive(Debug, Clone)]
pub struct TfliteLoader {
  model_path: PathBuf,
  optimize: bool,
}

impl ModelLoader for TfliteLoader {
  type Error = TfliteModelError;
  type Session = TfliteSession;

  fn load(&self) -> Result<Self::Session, Self::Error> {
    info!("加载模型文件: {}", self.model_path.display());
    let model_data = std::fs::read(&self.model_path)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    let mut model = tract_tflite::tflite()
      .model_for_read(&mut model_data.as_slice())
      .inspect_err(|e| error!("无法解析 TFLite 模型: {}", e))?;
    if self.optimize {
      model = model.into_optimized()?;
    }

    TfliteSession::from_model(model)
  }
}

pub struct TfliteSession {
  plan: TflitePlan,
  input_dt: DatumType,
  output_len: Option<usize>,
}

impl TfliteSession {
  /// 由已解析的模型生成执行计划；模型必须只有一个输入
  pub fn from_model(model: TypedModel) -> Result<Self, TfliteModelError> {
    if model.inputs.len() != 1 {
      return Err(TfliteModelError::ModelShapeError(format!(
        "预期模型输入数量为 1, 实际为 {}",
        model.inputs.len()
      )));
    }

    let input_dt = model.input_fact(0)?.datum_type;
    let output_len = model
      .output_fact(0)?
      .shape
      .as_concrete()
      .map(|dims| dims.iter().product::<usize>());
    debug!("模型输入类型: {:?}, 输出长度: {:?}", input_dt, output_len);

    let plan = model.into_runnable()?;
    Ok(TfliteSession {
      plan,
      input_dt,
      output_len,
    })
  }
}

impl Session for TfliteSession {
  type Error = TfliteModelError;

  fn output_len(&self) -> Option<usize> {
    self.output_len
  }

  fn run(&mut self, input: &[u8], shape: [usize; 4]) -> Result<Vec<f32>, Self::Error> {
    let mut tensor = Tensor::from_shape(&shape, input)?;
    // 量化输入沿用模型的零点与缩放
    if self.input_dt.is_quantized() && self.input_dt.unquantized() == u8::datum_type() {
      unsafe { tensor.set_datum_type(self.input_dt) };
    }

    let outputs = self.plan.run(tvec!(tensor.into()))?;
    let Some(output) = outputs.first() else {
      return Ok(Vec::new());
    };

    // 量化输出在这里反量化为 f32
    let scores = output.cast_to::<f32>()?;
    Ok(scores.as_slice::<f32>()?.to_vec())
  }
}
