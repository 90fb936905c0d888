// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/lib.rs - 库主文件
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

pub mod bitmap;
pub mod frame;
pub mod input;
pub mod model;
pub mod output;
pub mod task;

pub trait FromUrl {
  type Error;
  fn from_url(url: &url::Url) -> Result<Self, Self::Error>
  where
    Self: Sized;
}

pub trait FromUrlWithScheme: FromUrl {
  const SCHEME: &'static str;
}

#[derive(Error, Debug)]
#[error("URI 路径解码失败: {0}")]
pub struct UrlPathError(#[from] std::string::FromUtf8Error);

/// URI 路径转为本地路径，解开百分号编码（空格、中文文件名等）
pub fn url_file_path(url: &url::Url) -> Result<PathBuf, UrlPathError> {
  Ok(PathBuf::from(urlencoding::decode(url.path())?.into_owned()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn url_path_is_percent_decoded() {
    let url = url::Url::parse("image:///tmp/my apple 苹果.png").unwrap();
    assert_eq!(url.path(), "/tmp/my%20apple%20%E8%8B%B9%E6%9E%9C.png");
    assert_eq!(
      url_file_path(&url).unwrap(),
      PathBuf::from("/tmp/my apple 苹果.png")
    );
  }

  #[test]
  fn invalid_utf8_path_is_rejected() {
    let url = url::Url::parse("image:///tmp/%FF.png").unwrap();
    assert!(url_file_path(&url).is_err());
  }
}
