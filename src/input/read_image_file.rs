// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入（相册选图）
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

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, UrlPathError,
  bitmap::{Bitmap, BitmapError},
  input::{Capture, CaptureOptions, InputError},
};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("Preprocess error: {0}")]
  PreprocessError(#[from] BitmapError),
  #[error("Query error: {0}")]
  QueryError(Box<InputError>),
  #[error("Path error: {0}")]
  PathError(#[from] UrlPathError),
}

/// 单张图像输入，迭代一次后结束
pub struct ImageFileInput<const W: u32, const H: u32> {
  capture: Option<Capture<W, H>>,
}

impl<const W: u32, const H: u32> FromUrlWithScheme for ImageFileInput<W, H> {
  const SCHEME: &'static str = "image";
}

impl<const W: u32, const H: u32> FromUrl for ImageFileInput<W, H> {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let options =
      CaptureOptions::from_query(url).map_err(|e| ImageFileInputError::QueryError(Box::new(e)))?;

    let path = crate::url_file_path(url)?;
    let bitmap = Bitmap::from(ImageReader::open(&path)?.with_guessed_format()?.decode()?);
    debug!(
      "读取图像 {}: {}x{}",
      path.display(),
      bitmap.width(),
      bitmap.height()
    );

    let capture = Capture::from_bitmap(path.display().to_string(), &bitmap, &options)?;
    Ok(ImageFileInput {
      capture: Some(capture),
    })
  }
}

impl<const W: u32, const H: u32> Iterator for ImageFileInput<W, H> {
  type Item = Capture<W, H>;

  fn next(&mut self) -> Option<Self::Item> {
    self.capture.take()
  }
}
