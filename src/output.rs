// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/output.rs - 输出定义
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

use crate::FromUrl;
#[cfg(any(
  feature = "console_output",
  feature = "json_record",
  feature = "directory_record"
))]
use crate::FromUrlWithScheme;
use crate::input::Capture;
use crate::model::ClassifyResult;
use thiserror::Error;
use url::Url;

pub trait Render<Frame, Output>: Sized {
  type Error;
  fn render_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error>;
}

#[cfg(feature = "console_output")]
mod console_output;
#[cfg(feature = "console_output")]
pub use self::console_output::{ConsoleOutput, ConsoleOutputError};

#[cfg(feature = "json_record")]
mod json_record;
#[cfg(feature = "json_record")]
pub use self::json_record::{JsonRecordOutput, JsonRecordOutputError};

#[cfg(feature = "directory_record")]
mod directory_record;
#[cfg(feature = "directory_record")]
pub use self::directory_record::{DirectoryRecordOutput, DirectoryRecordOutputError};

#[derive(Error, Debug)]
pub enum OutputError {
  #[cfg(feature = "console_output")]
  #[error("控制台输出错误: {0}")]
  ConsoleOutputError(#[from] ConsoleOutputError),
  #[cfg(feature = "json_record")]
  #[error("JSON 记录输出错误: {0}")]
  JsonRecordOutputError(#[from] JsonRecordOutputError),
  #[cfg(feature = "directory_record")]
  #[error("目录记录输出错误: {0}")]
  DirectoryRecordOutputError(#[from] DirectoryRecordOutputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum OutputWrapper<const W: u32, const H: u32> {
  #[cfg(feature = "console_output")]
  ConsoleOutput(ConsoleOutput),
  #[cfg(feature = "json_record")]
  JsonRecordOutput(JsonRecordOutput),
  #[cfg(feature = "directory_record")]
  DirectoryRecordOutput(DirectoryRecordOutput<W, H>),
}

impl<const W: u32, const H: u32> FromUrl for OutputWrapper<W, H> {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "console_output")]
    if url.scheme() == ConsoleOutput::SCHEME {
      let output = ConsoleOutput::from_url(url)?;
      return Ok(OutputWrapper::ConsoleOutput(output));
    }
    #[cfg(feature = "json_record")]
    if url.scheme() == JsonRecordOutput::SCHEME {
      let output = JsonRecordOutput::from_url(url)?;
      return Ok(OutputWrapper::JsonRecordOutput(output));
    }
    #[cfg(feature = "directory_record")]
    if url.scheme() == DirectoryRecordOutput::<W, H>::SCHEME {
      let output = DirectoryRecordOutput::from_url(url)?;
      return Ok(OutputWrapper::DirectoryRecordOutput(output));
    }
    Err(OutputError::SchemeMismatch)
  }
}

impl<const W: u32, const H: u32> Render<Capture<W, H>, ClassifyResult> for OutputWrapper<W, H> {
  type Error = OutputError;

  fn render_result(
    &self,
    frame: &Capture<W, H>,
    result: &ClassifyResult,
  ) -> Result<(), Self::Error> {
    match self {
      #[cfg(feature = "console_output")]
      OutputWrapper::ConsoleOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      #[cfg(feature = "json_record")]
      OutputWrapper::JsonRecordOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecordOutput(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
    }
  }
}
