// 该文件是 Guoxian （果鲜） 项目的一部分。
// tests/common/mod.rs - 测试用的模拟模型与输出
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

#![allow(dead_code)]

use std::{
  cell::RefCell,
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use guoxian::{
  input::Capture,
  model::{ClassifyResult, ModelLoader, Session},
  output::Render,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MockError {
  #[error("model file missing")]
  Missing,
  #[error("inference exploded")]
  Inference,
}

#[derive(Default)]
pub struct Counters {
  pub loads: AtomicUsize,
  pub releases: AtomicUsize,
  pub runs: AtomicUsize,
  pub last_input: Mutex<Option<(Vec<u8>, [usize; 4])>>,
}

impl Counters {
  pub fn loads(&self) -> usize {
    self.loads.load(Ordering::SeqCst)
  }

  pub fn releases(&self) -> usize {
    self.releases.load(Ordering::SeqCst)
  }

  pub fn runs(&self) -> usize {
    self.runs.load(Ordering::SeqCst)
  }
}

/// 返回固定输出的模拟加载器；`fail_loads` 中列出的加载序号（从 1 开始）会失败
pub struct MockLoader {
  pub scores: Vec<f32>,
  pub output_len: Option<usize>,
  pub fail_loads: Vec<usize>,
  pub fail_runs: bool,
  pub counters: Arc<Counters>,
}

impl MockLoader {
  pub fn new(scores: Vec<f32>) -> Self {
    MockLoader {
      output_len: Some(scores.len()),
      scores,
      fail_loads: Vec::new(),
      fail_runs: false,
      counters: Arc::new(Counters::default()),
    }
  }

  pub fn output_len(mut self, output_len: Option<usize>) -> Self {
    self.output_len = output_len;
    self
  }

  pub fn fail_loads(mut self, loads: &[usize]) -> Self {
    self.fail_loads = loads.to_vec();
    self
  }

  pub fn fail_runs(mut self) -> Self {
    self.fail_runs = true;
    self
  }

  pub fn counters(&self) -> Arc<Counters> {
    self.counters.clone()
  }
}

impl ModelLoader for MockLoader {
  type Error = MockError;
  type Session = MockSession;

  fn load(&self) -> Result<Self::Session, Self::Error> {
    let n = self.counters.loads.fetch_add(1, Ordering::SeqCst) + 1;
    if self.fail_loads.contains(&n) {
      return Err(MockError::Missing);
    }

    Ok(MockSession {
      scores: self.scores.clone(),
      output_len: self.output_len,
      fail_runs: self.fail_runs,
      counters: self.counters.clone(),
    })
  }
}

pub struct MockSession {
  scores: Vec<f32>,
  output_len: Option<usize>,
  fail_runs: bool,
  counters: Arc<Counters>,
}

impl Session for MockSession {
  type Error = MockError;

  fn output_len(&self) -> Option<usize> {
    self.output_len
  }

  fn run(&mut self, input: &[u8], shape: [usize; 4]) -> Result<Vec<f32>, Self::Error> {
    self.counters.runs.fetch_add(1, Ordering::SeqCst);
    if let Ok(mut last) = self.counters.last_input.lock() {
      *last = Some((input.to_vec(), shape));
    }
    if self.fail_runs {
      return Err(MockError::Inference);
    }
    Ok(self.scores.clone())
  }
}

impl Drop for MockSession {
  fn drop(&mut self) {
    self.counters.releases.fetch_add(1, Ordering::SeqCst);
  }
}

/// 记录每次渲染的 `<来源>: <文本>`
#[derive(Default)]
pub struct RecordingOutput {
  pub lines: RefCell<Vec<String>>,
}

impl<const W: u32, const H: u32> Render<Capture<W, H>, ClassifyResult> for &RecordingOutput {
  type Error = std::convert::Infallible;

  fn render_result(&self, frame: &Capture<W, H>, result: &ClassifyResult) -> Result<(), Self::Error> {
    self
      .lines
      .borrow_mut()
      .push(format!("{}: {}", frame.origin, result.classification));
    Ok(())
  }
}
