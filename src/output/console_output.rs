// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/output/console_output.rs - 控制台输出
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

use std::io::Write;

use thiserror::Error;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  input::Capture,
  model::{Classification, ClassifyResult},
  output::Render,
};

#[derive(Error, Debug)]
pub enum ConsoleOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 每次分类向标准输出写一行：`<来源>: <标签或诊断信息>`
pub struct ConsoleOutput {
  verbose: bool,
}

impl FromUrlWithScheme for ConsoleOutput {
  const SCHEME: &'static str = "console";
}

impl FromUrl for ConsoleOutput {
  type Error = ConsoleOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(ConsoleOutputError::SchemeMismatch);
    }

    let verbose = uri.query_pairs().any(|(k, _)| k == "verbose");
    Ok(ConsoleOutput { verbose })
  }
}

impl ConsoleOutput {
  pub fn line(&self, origin: &str, result: &ClassifyResult) -> String {
    match (&result.classification, self.verbose) {
      (Classification::Label { label, score, .. }, true) => {
        format!("{}: {} ({:.4})", origin, label, score)
      }
      (classification, _) => format!("{}: {}", origin, classification),
    }
  }
}

impl<const W: u32, const H: u32> Render<Capture<W, H>, ClassifyResult> for ConsoleOutput {
  type Error = ConsoleOutputError;

  fn render_result(&self, frame: &Capture<W, H>, result: &ClassifyResult) -> Result<(), Self::Error> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", self.line(&frame.origin, result))?;
    Ok(())
  }
}
