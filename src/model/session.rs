// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/model/session.rs - 模型资源的获取与释放
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

use std::ops::{Deref, DerefMut};

use tracing::debug;

/// 已加载的模型，一次前向推理
pub trait Session {
  type Error: std::error::Error + Send + Sync + 'static;

  /// 模型声明的输出元素个数；形状不确定时为 `None`
  fn output_len(&self) -> Option<usize>;

  /// `input` 为 `shape` 形状的 u8 NHWC 数据，返回展平的 f32 输出
  fn run(&mut self, input: &[u8], shape: [usize; 4]) -> Result<Vec<f32>, Self::Error>;
}

/// 模型加载器，每次调用 `load` 得到一个新的会话
pub trait ModelLoader {
  type Error: std::error::Error + Send + Sync + 'static;
  type Session: Session<Error = Self::Error>;

  fn load(&self) -> Result<Self::Session, Self::Error>;
}

/// 作用域内持有的模型会话，离开作用域即释放
pub struct ScopedModel<S: Session> {
  session: S,
}

impl<S: Session> ScopedModel<S> {
  pub fn acquire<L>(loader: &L) -> Result<Self, L::Error>
  where
    L: ModelLoader<Session = S>,
  {
    let session = loader.load()?;
    debug!("模型资源已获取");
    Ok(ScopedModel { session })
  }
}

impl<S: Session> Deref for ScopedModel<S> {
  type Target = S;

  fn deref(&self) -> &Self::Target {
    &self.session
  }
}

impl<S: Session> DerefMut for ScopedModel<S> {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.session
  }
}

impl<S: Session> Drop for ScopedModel<S> {
  fn drop(&mut self) {
    debug!("释放模型资源");
  }
}
