// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/input/read_image_dir.rs - 图像目录输入
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

use std::{
  collections::VecDeque,
  path::{Path, PathBuf},
};

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, UrlPathError,
  bitmap::Bitmap,
  input::{Capture, CaptureOptions, InputError},
};

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "gif", "webp"];

#[derive(Error, Debug)]
pub enum ImageDirInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("URI 参数错误: {0}")]
  QueryError(Box<InputError>),
  #[error("URI 路径错误: {0}")]
  PathError(#[from] UrlPathError),
}

/// 目录下的所有图像，按文件名排序依次读取；无法解码的文件会被跳过
pub struct ImageDirInput<const W: u32, const H: u32> {
  paths: VecDeque<PathBuf>,
  options: CaptureOptions,
}

impl<const W: u32, const H: u32> FromUrlWithScheme for ImageDirInput<W, H> {
  const SCHEME: &'static str = "folder";
}

impl<const W: u32, const H: u32> FromUrl for ImageDirInput<W, H> {
  type Error = ImageDirInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(ImageDirInputError::SchemeMismatch);
    }

    let options =
      CaptureOptions::from_query(url).map_err(|e| ImageDirInputError::QueryError(Box::new(e)))?;

    let mut paths = Vec::new();
    let directory = crate::url_file_path(url)?;
    for entry in std::fs::read_dir(&directory)? {
      let path = entry?.path();
      if path.is_file() && is_image_file(&path) {
        paths.push(path);
      }
    }
    paths.sort();
    info!("目录 {} 中找到 {} 张图像", directory.display(), paths.len());

    Ok(ImageDirInput {
      paths: paths.into(),
      options,
    })
  }
}

impl<const W: u32, const H: u32> ImageDirInput<W, H> {
  fn load(&self, path: &Path) -> Option<Capture<W, H>> {
    let decoded = ImageReader::open(path)
      .and_then(|reader| reader.with_guessed_format())
      .map_err(image::ImageError::IoError)
      .and_then(|reader| reader.decode());
    let bitmap = match decoded {
      Ok(image) => Bitmap::from(image),
      Err(e) => {
        warn!("跳过无法读取的图像 {}: {}", path.display(), e);
        return None;
      }
    };
    debug!(
      "读取图像 {}: {}x{}",
      path.display(),
      bitmap.width(),
      bitmap.height()
    );

    match Capture::from_bitmap(path.display().to_string(), &bitmap, &self.options) {
      Ok(capture) => Some(capture),
      Err(e) => {
        warn!("跳过无法预处理的图像 {}: {}", path.display(), e);
        None
      }
    }
  }
}

impl<const W: u32, const H: u32> Iterator for ImageDirInput<W, H> {
  type Item = Capture<W, H>;

  fn next(&mut self) -> Option<Self::Item> {
    while let Some(path) = self.paths.pop_front() {
      if let Some(capture) = self.load(&path) {
        return Some(capture);
      }
    }
    None
  }
}

fn is_image_file(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| {
      IMAGE_EXTENSIONS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
    })
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn image_extensions_are_case_insensitive() {
    assert!(is_image_file(Path::new("a/b/apple.JPG")));
    assert!(is_image_file(Path::new("banana.webp")));
    assert!(!is_image_file(Path::new("labels.txt")));
    assert!(!is_image_file(Path::new("no_extension")));
  }
}
