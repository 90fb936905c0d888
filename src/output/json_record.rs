// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/output/json_record.rs - JSON Lines 结果记录
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

use std::{fs::OpenOptions, io::Write, path::PathBuf};

use serde_json::json;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, UrlPathError, input::Capture, model::ClassifyResult, output::Render,
};

#[derive(Error, Debug)]
pub enum JsonRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("URI 路径错误: {0}")]
  PathError(#[from] UrlPathError),
}

/// 每次分类向文件追加一行 JSON
pub struct JsonRecordOutput {
  path: PathBuf,
}

impl FromUrlWithScheme for JsonRecordOutput {
  const SCHEME: &'static str = "json";
}

impl FromUrl for JsonRecordOutput {
  type Error = JsonRecordOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(JsonRecordOutputError::SchemeMismatch);
    }

    Ok(JsonRecordOutput {
      path: crate::url_file_path(uri)?,
    })
  }
}

impl JsonRecordOutput {
  pub fn record(&self, origin: &str, result: &ClassifyResult) -> Result<(), JsonRecordOutputError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    let classification = &result.classification;
    let line = serde_json::to_string(&json!({
      "origin": origin,
      "result": classification.text(),
      "label": classification.label(),
      "index": classification.index(),
      "score": classification.score(),
      "scores": result.scores,
    }))?;

    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.path)?;
    writeln!(file, "{}", line)?;
    debug!("记录结果到 {}: {}", self.path.display(), line);

    Ok(())
  }
}

impl<const W: u32, const H: u32> Render<Capture<W, H>, ClassifyResult> for JsonRecordOutput {
  type Error = JsonRecordOutputError;

  fn render_result(&self, frame: &Capture<W, H>, result: &ClassifyResult) -> Result<(), Self::Error> {
    self.record(&frame.origin, result)
  }
}
