// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/input.rs - 图像输入
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

use std::fmt;

use thiserror::Error;
use url::Url;

use crate::{
  FromUrl,
  bitmap::{Bitmap, BitmapError},
  frame::{FrameError, RgbNhwcFrame, ScaleFilter},
};

pub trait AsNhwcFrame<const W: u32, const H: u32> {
  fn as_nhwc(&self) -> &[u8];
}

#[cfg(feature = "read_image_file")]
mod read_image_file;
#[cfg(feature = "read_image_file")]
pub use self::read_image_file::{ImageFileInput, ImageFileInputError};

#[cfg(feature = "read_image_dir")]
mod read_image_dir;
#[cfg(feature = "read_image_dir")]
pub use self::read_image_dir::{ImageDirInput, ImageDirInputError};

#[derive(Error, Debug)]
pub enum InputError {
  #[cfg(feature = "read_image_file")]
  #[error("图像文件输入错误: {0}")]
  ImageFileInputError(#[from] ImageFileInputError),
  #[cfg(feature = "read_image_dir")]
  #[error("图像目录输入错误: {0}")]
  ImageDirInputError(#[from] ImageDirInputError),
  #[error("URI 参数错误: {0}")]
  InvalidQuery(#[from] FrameError),
  #[error("未知的裁剪方式: {0}")]
  UnknownCrop(String),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

/// 缩放前的裁剪方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CropMode {
  #[default]
  None,
  /// 取中心正方形，拍照输入使用
  Center,
}

/// 从 URI 查询参数解析的采集选项：`crop=center`、`filter=nearest` 等
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureOptions {
  pub crop: CropMode,
  pub filter: ScaleFilter,
}

impl CaptureOptions {
  pub fn from_query(url: &Url) -> Result<Self, InputError> {
    let mut options = CaptureOptions::default();
    for (k, v) in url.query_pairs() {
      match k.as_ref() {
        "crop" => {
          options.crop = match v.as_ref() {
            "center" => CropMode::Center,
            "none" => CropMode::None,
            other => return Err(InputError::UnknownCrop(other.to_string())),
          }
        }
        "filter" => options.filter = v.parse()?,
        _ => {}
      }
    }
    Ok(options)
  }
}

/// 一次采集：来源 + 预处理后的帧
#[derive(Debug, Clone)]
pub struct Capture<const W: u32, const H: u32> {
  pub origin: String,
  pub frame: RgbNhwcFrame<W, H>,
}

impl<const W: u32, const H: u32> Capture<W, H> {
  pub fn from_bitmap(
    origin: impl Into<String>,
    bitmap: &Bitmap,
    options: &CaptureOptions,
  ) -> Result<Self, BitmapError> {
    let frame = match options.crop {
      CropMode::None => RgbNhwcFrame::from_bitmap(bitmap, options.filter)?,
      CropMode::Center => RgbNhwcFrame::from_bitmap(&bitmap.center_square(), options.filter)?,
    };

    Ok(Capture {
      origin: origin.into(),
      frame,
    })
  }
}

impl<const W: u32, const H: u32> AsNhwcFrame<W, H> for Capture<W, H> {
  fn as_nhwc(&self) -> &[u8] {
    self.frame.as_nhwc()
  }
}

impl<const W: u32, const H: u32> fmt::Display for Capture<W, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.origin)
  }
}

pub enum InputWrapper<const W: u32, const H: u32> {
  #[cfg(feature = "read_image_file")]
  ReadImageFile(ImageFileInput<W, H>),
  #[cfg(feature = "read_image_dir")]
  ReadImageDir(ImageDirInput<W, H>),
}

impl<const W: u32, const H: u32> FromUrl for InputWrapper<W, H> {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "read_image_file")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == ImageFileInput::<W, H>::SCHEME {
        let input = ImageFileInput::from_url(url)?;
        return Ok(InputWrapper::ReadImageFile(input));
      }
    }
    #[cfg(feature = "read_image_dir")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == ImageDirInput::<W, H>::SCHEME {
        let input = ImageDirInput::from_url(url)?;
        return Ok(InputWrapper::ReadImageDir(input));
      }
    }
    Err(InputError::SchemeMismatch)
  }
}

impl<const W: u32, const H: u32> Iterator for InputWrapper<W, H> {
  type Item = Capture<W, H>;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      #[cfg(feature = "read_image_file")]
      InputWrapper::ReadImageFile(input) => input.next(),
      #[cfg(feature = "read_image_dir")]
      InputWrapper::ReadImageDir(input) => input.next(),
    }
  }
}
