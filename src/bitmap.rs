// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/bitmap.rs - ARGB-8888 位图
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

use image::{DynamicImage, RgbaImage, imageops::FilterType};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BitmapError {
  #[error("位图尺寸无效: {0}x{1}")]
  EmptyBitmap(u32, u32),
  #[error("像素数量不匹配: 期望 {expected}, 实际 {actual}")]
  PixelCountMismatch { expected: usize, actual: usize },
}

/// 将 A/R/G/B 通道打包为 `0xAARRGGBB`
pub const fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
  ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// ARGB-8888 位图，每个像素一个 `u32`，按行优先存储
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
  width: u32,
  height: u32,
  pixels: Box<[u32]>,
}

impl Bitmap {
  pub fn from_argb(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self, BitmapError> {
    let expected = width as usize * height as usize;
    if pixels.len() != expected {
      return Err(BitmapError::PixelCountMismatch {
        expected,
        actual: pixels.len(),
      });
    }

    Ok(Self {
      width,
      height,
      pixels: pixels.into_boxed_slice(),
    })
  }

  /// 单色位图
  pub fn filled(width: u32, height: u32, argb: u32) -> Self {
    let pixels = vec![argb; width as usize * height as usize].into_boxed_slice();
    Self {
      width,
      height,
      pixels,
    }
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn pixels(&self) -> &[u32] {
    &self.pixels
  }

  pub fn pixel(&self, x: u32, y: u32) -> u32 {
    self.pixels[y as usize * self.width as usize + x as usize]
  }

  pub fn is_empty(&self) -> bool {
    self.width == 0 || self.height == 0
  }

  /// 以中心为基准裁剪出边长为 `min(width, height)` 的正方形
  pub fn center_square(&self) -> Bitmap {
    let side = self.width.min(self.height);
    let x0 = (self.width - side) / 2;
    let y0 = (self.height - side) / 2;

    let mut pixels = Vec::with_capacity(side as usize * side as usize);
    for y in y0..y0 + side {
      let row = y as usize * self.width as usize;
      pixels.extend_from_slice(&self.pixels[row + x0 as usize..row + (x0 + side) as usize]);
    }

    Bitmap {
      width: side,
      height: side,
      pixels: pixels.into_boxed_slice(),
    }
  }

  /// 缩放到指定尺寸；尺寸相同时直接复制
  pub fn scaled(&self, width: u32, height: u32, filter: FilterType) -> Result<Bitmap, BitmapError> {
    if self.is_empty() {
      return Err(BitmapError::EmptyBitmap(self.width, self.height));
    }
    if width == 0 || height == 0 {
      return Err(BitmapError::EmptyBitmap(width, height));
    }
    if self.width == width && self.height == height {
      return Ok(self.clone());
    }

    let resized = image::imageops::resize(&self.to_rgba_image(), width, height, filter);
    Ok(Bitmap::from(&resized))
  }

  pub fn to_rgba_image(&self) -> RgbaImage {
    RgbaImage::from_fn(self.width, self.height, |x, y| {
      let [a, r, g, b] = self.pixel(x, y).to_be_bytes();
      image::Rgba([r, g, b, a])
    })
  }
}

impl From<&RgbaImage> for Bitmap {
  fn from(image: &RgbaImage) -> Self {
    let pixels = image
      .pixels()
      .map(|p| pack_argb(p[3], p[0], p[1], p[2]))
      .collect::<Vec<_>>()
      .into_boxed_slice();

    Bitmap {
      width: image.width(),
      height: image.height(),
      pixels,
    }
  }
}

impl From<DynamicImage> for Bitmap {
  fn from(image: DynamicImage) -> Self {
    Bitmap::from(&image.into_rgba8())
  }
}
