// 该文件是 Guoxian （果鲜） 项目的一部分。
// src/task.rs - 分类任务
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
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::{Duration, Instant},
};
use tracing::{error, info, warn};

use crate::{model::Model, output::Render};

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error>;
}

/// 任务统计：成功渲染的次数与推理失败的次数
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskSummary {
  pub rendered: usize,
  pub failed: usize,
}

/// 推理一次并渲染；推理错误只记录日志，不中断任务
fn classify_and_render<F, D, M, O>(model: &M, output: &O, frame: &F) -> anyhow::Result<bool>
where
  M: Model<Input = F, Output = D>,
  M::Error: std::fmt::Display,
  O: Render<F, D>,
  O::Error: std::error::Error + Send + Sync + 'static,
{
  let now = Instant::now();
  match model.infer(frame) {
    Ok(result) => {
      info!("推理完成，耗时: {:.2?}", now.elapsed());
      output.render_result(frame, &result)?;
      Ok(true)
    }
    Err(e) => {
      error!("分类失败: {}", e);
      Ok(false)
    }
  }
}

pub struct OneShotTask;

impl<F, D, I, M, O> Task<I, M, O> for OneShotTask
where
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D>,
  M::Error: std::fmt::Display,
  O: Render<F, D>,
  O::Error: std::error::Error + Send + Sync + 'static,
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始推理...");
    classify_and_render(&model, &output, &frame)?;
    info!("任务完成");

    Ok(())
  }
}

pub struct RepeatShotTask {
  repeat_times: usize,
}

impl Default for RepeatShotTask {
  fn default() -> Self {
    RepeatShotTask { repeat_times: 100 }
  }
}

impl RepeatShotTask {
  pub fn with_repeat_times(mut self, repeat_times: usize) -> Self {
    self.repeat_times = repeat_times;
    self
  }
}

impl<F, D, I, M, O> Task<I, M, O> for RepeatShotTask
where
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D>,
  M::Error: std::fmt::Display,
  O: Render<F, D>,
  O::Error: std::error::Error + Send + Sync + 'static,
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<(), Self::Error> {
    // 前两次视为预热，不计入平均
    const WARMUP_TIMES: usize = 2;

    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始推理...");
    let mut times = Vec::with_capacity(self.repeat_times);
    for i in 0..self.repeat_times {
      let now = Instant::now();
      let result = match model.infer(&frame) {
        Ok(result) => result,
        Err(e) => {
          error!("({})分类失败: {}", i, e);
          continue;
        }
      };
      let elapsed = now.elapsed();
      info!("({})推理完成，耗时: {:.2?}", i, elapsed);
      output.render_result(&frame, &result)?;
      times.push(elapsed);
    }

    if times.len() > WARMUP_TIMES {
      warn!(
        "平均推理时间: {:.2?}",
        times.iter().skip(WARMUP_TIMES).sum::<Duration>() / (times.len() - WARMUP_TIMES) as u32
      );
    } else {
      warn!("有效推理次数不足，无法统计平均时间");
    }

    Ok(())
  }
}

#[derive(Default, Debug)]
pub struct ContinuousTask {
  frame_number: Option<usize>,
  stop: Option<Arc<AtomicBool>>,
}

impl ContinuousTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  /// 使用外部停止标志，不再安装 Ctrl-C 处理器
  pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
    self.stop = Some(stop);
    self
  }

  fn stop_flag(&self) -> Arc<AtomicBool> {
    if let Some(stop) = &self.stop {
      return stop.clone();
    }

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
      info!("收到中断信号，准备退出...");
      handler_stop.store(true, Ordering::SeqCst);
    }) {
      warn!("无法设置 Ctrl-C 处理器: {}", e);
    }
    stop
  }

  pub fn run_with_summary<F, D, I, M, O>(
    self,
    input: I,
    model: M,
    output: O,
  ) -> anyhow::Result<TaskSummary>
  where
    I: Iterator<Item = F>,
    M: Model<Input = F, Output = D>,
    M::Error: std::fmt::Display,
    O: Render<F, D>,
    O::Error: std::error::Error + Send + Sync + 'static,
  {
    info!("开始任务...");
    let stop = self.stop_flag();

    let mut summary = TaskSummary::default();
    let mut frame_index = 0usize;
    for frame in input {
      if stop.load(Ordering::SeqCst) {
        warn!("中断信号接收，退出任务循环");
        break;
      }

      frame_index += 1;
      info!("处理第 {} 张图像", frame_index);
      if classify_and_render(&model, &output, &frame)? {
        summary.rendered += 1;
      } else {
        summary.failed += 1;
      }

      if self.frame_number.is_some_and(|n| frame_index >= n) {
        info!("达到指定帧数 {}, 退出任务循环", frame_index);
        break;
      }
    }

    info!(
      "任务完成，成功 {} 张，失败 {} 张",
      summary.rendered, summary.failed
    );
    Ok(summary)
  }
}

impl<F, D, I, M, O> Task<I, M, O> for ContinuousTask
where
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D>,
  M::Error: std::fmt::Display,
  O: Render<F, D>,
  O::Error: std::error::Error + Send + Sync + 'static,
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error> {
    self.run_with_summary(input, model, output).map(|_| ())
  }
}
