// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/output/directory_record.rs - 按类别归档的目录记录输出
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
  path::PathBuf,
  sync::atomic::{AtomicU16, Ordering},
};

use chrono::{DateTime, Datelike, Utc};
use thiserror::Error;
use tracing::info;

use crate::{
  FromUrl, FromUrlWithScheme, UrlPathError,
  input::Capture,
  model::{Classification, ClassifyResult},
  output::Render,
};

const UNCLASSIFIED_DIR: &str = "_unclassified";

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("URI 路径错误: {0}")]
  PathError(#[from] UrlPathError),
}

/// 把预处理后的帧保存到 `<目录>/<标签>/<年>/<月>/<日>/<时-分-秒>-<序号>.png`
pub struct DirectoryRecordOutput<const W: u32, const H: u32> {
  directory: PathBuf,
  frame_counter: AtomicU16,
}

impl<const W: u32, const H: u32> FromUrlWithScheme for DirectoryRecordOutput<W, H> {
  const SCHEME: &'static str = "folder";
}

impl<const W: u32, const H: u32> FromUrl for DirectoryRecordOutput<W, H> {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    Ok(DirectoryRecordOutput::new(crate::url_file_path(uri)?))
  }
}

impl<const W: u32, const H: u32> DirectoryRecordOutput<W, H> {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    DirectoryRecordOutput {
      directory: directory.into(),
      frame_counter: AtomicU16::new(0),
    }
  }

  fn frame_id(&self) -> u16 {
    self.frame_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
  }

  fn category_dir(classification: &Classification) -> String {
    match classification.label() {
      Some(label) => label.replace(['/', '\\'], "_"),
      None => UNCLASSIFIED_DIR.to_string(),
    }
  }

  pub fn frame_path(
    &self,
    classification: &Classification,
    now: DateTime<Utc>,
  ) -> Result<PathBuf, DirectoryRecordOutputError> {
    let directory = self
      .directory
      .join(Self::category_dir(classification))
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }
}

impl<const W: u32, const H: u32> Render<Capture<W, H>, ClassifyResult>
  for DirectoryRecordOutput<W, H>
{
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, frame: &Capture<W, H>, result: &ClassifyResult) -> Result<(), Self::Error> {
    let path = self.frame_path(&result.classification, Utc::now())?;
    frame.frame.to_rgb_image().save(&path)?;
    info!(
      "{} -> {} ({})",
      frame.origin,
      path.display(),
      result.classification
    );
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    bitmap::{Bitmap, pack_argb},
    input::CaptureOptions,
    model::LabelTable,
  };
  use chrono::TimeZone;
  use std::path::Path;

  #[test]
  fn frames_are_filed_by_label_and_date() {
    let dir = tempfile::tempdir().unwrap();
    let output = DirectoryRecordOutput::<8, 8>::new(dir.path());
    let now = Utc.with_ymd_and_hms(2026, 3, 7, 9, 5, 1).unwrap();

    let labels = LabelTable::default();
    let result = ClassifyResult::new(vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0], &labels);
    let path = output.frame_path(&result.classification, now).unwrap();
    assert_eq!(
      path,
      dir
        .path()
        .join("Rotten Banana/2026/03/07/09-05-01-0001.png")
    );

    let path = output
      .frame_path(&ClassifyResult::new(vec![], &labels).classification, now)
      .unwrap();
    assert_eq!(
      path,
      dir
        .path()
        .join("_unclassified/2026/03/07/09-05-01-0002.png")
    );
  }

  #[test]
  fn render_saves_png_frame() {
    let dir = tempfile::tempdir().unwrap();
    let output = DirectoryRecordOutput::<8, 8>::new(dir.path());
    let bitmap = Bitmap::filled(16, 16, pack_argb(255, 10, 200, 30));
    let capture = Capture::<8, 8>::from_bitmap("x.png", &bitmap, &CaptureOptions::default()).unwrap();
    let result = ClassifyResult::new(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0], &LabelTable::default());

    output.render_result(&capture, &result).unwrap();

    let files = walk_files(&dir.path().join("Fresh Apple"));
    assert_eq!(files.len(), 1);
    let saved = image::open(&files[0]).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (8, 8));
  }

  #[test]
  fn url_directory_is_percent_decoded() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("归档 photos");
    let url = url::Url::parse(&format!("folder://{}", target.display())).unwrap();
    let output = DirectoryRecordOutput::<8, 8>::from_url(&url).unwrap();

    let bitmap = Bitmap::filled(8, 8, pack_argb(255, 0, 0, 0));
    let capture = Capture::<8, 8>::from_bitmap("y.png", &bitmap, &CaptureOptions::default()).unwrap();
    let result = ClassifyResult::new(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0], &LabelTable::default());
    output.render_result(&capture, &result).unwrap();

    assert_eq!(walk_files(&target.join("Rotten Orange")).len(), 1);
  }

  fn walk_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
      for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
          pending.push(path);
        } else {
          files.push(path);
        }
      }
    }
    files
  }
}
