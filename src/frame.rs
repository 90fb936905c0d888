// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/frame.rs - NHWC 帧定义与图像预处理
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

use std::str::FromStr;

use image::{RgbImage, imageops::FilterType};
use thiserror::Error;

use crate::{
  bitmap::{Bitmap, BitmapError},
  input::AsNhwcFrame,
};

pub const RGB_CHANNELS: usize = 3;

#[derive(Error, Debug)]
pub enum FrameError {
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
  #[error("未知的缩放滤波器: {0}")]
  UnknownFilter(String),
}

/// 缩放滤波器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScaleFilter {
  Nearest,
  /// 双线性
  #[default]
  Triangle,
  CatmullRom,
  Gaussian,
  Lanczos3,
}

impl From<ScaleFilter> for FilterType {
  fn from(filter: ScaleFilter) -> Self {
    match filter {
      ScaleFilter::Nearest => FilterType::Nearest,
      ScaleFilter::Triangle => FilterType::Triangle,
      ScaleFilter::CatmullRom => FilterType::CatmullRom,
      ScaleFilter::Gaussian => FilterType::Gaussian,
      ScaleFilter::Lanczos3 => FilterType::Lanczos3,
    }
  }
}

impl FromStr for ScaleFilter {
  type Err = FrameError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "nearest" => Ok(ScaleFilter::Nearest),
      "triangle" | "bilinear" => Ok(ScaleFilter::Triangle),
      "catmullrom" => Ok(ScaleFilter::CatmullRom),
      "gaussian" => Ok(ScaleFilter::Gaussian),
      "lanczos3" => Ok(ScaleFilter::Lanczos3),
      other => Err(FrameError::UnknownFilter(other.to_string())),
    }
  }
}

/// `W x H` 的 RGB 帧，按 NHWC（行优先，RGB 交错）存储的 u8 数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbNhwcFrame<const W: u32, const H: u32> {
  data: Box<[u8]>,
}

impl<const W: u32, const H: u32> RgbNhwcFrame<W, H> {
  pub const LEN: usize = RGB_CHANNELS * W as usize * H as usize;
  /// 张量形状 `[1, H, W, 3]`
  pub const SHAPE: [usize; 4] = [1, H as usize, W as usize, RGB_CHANNELS];

  /// 预处理：缩放到 `W x H`，逐像素取出 R、G、B 字节，丢弃 alpha，不做归一化
  pub fn from_bitmap(bitmap: &Bitmap, filter: ScaleFilter) -> Result<Self, BitmapError> {
    let scaled = bitmap.scaled(W, H, filter.into())?;

    let mut data = Vec::with_capacity(Self::LEN);
    for &argb in scaled.pixels() {
      data.push(((argb >> 16) & 0xFF) as u8);
      data.push(((argb >> 8) & 0xFF) as u8);
      data.push((argb & 0xFF) as u8);
    }

    Ok(Self {
      data: data.into_boxed_slice(),
    })
  }

  pub fn to_rgb_image(&self) -> RgbImage {
    RgbImage::from_fn(W, H, |x, y| {
      let index = (y as usize * W as usize + x as usize) * RGB_CHANNELS;
      image::Rgb([self.data[index], self.data[index + 1], self.data[index + 2]])
    })
  }
}

impl<const W: u32, const H: u32> TryFrom<Vec<u8>> for RgbNhwcFrame<W, H> {
  type Error = FrameError;

  fn try_from(data: Vec<u8>) -> Result<Self, Self::Error> {
    if data.len() != Self::LEN {
      return Err(FrameError::LengthMismatch {
        expected: Self::LEN,
        actual: data.len(),
      });
    }

    Ok(Self {
      data: data.into_boxed_slice(),
    })
  }
}

impl<const W: u32, const H: u32> AsNhwcFrame<W, H> for RgbNhwcFrame<W, H> {
  fn as_nhwc(&self) -> &[u8] {
    &self.data
  }
}
