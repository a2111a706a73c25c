//! 定时任务触发规格
//!
//! 两种形式：固定速率（毫秒，整除换算为整秒）和两段式周期字符串。
//! 周期字符串 `"S M"` 的含义是 `S + M*60` 秒 —— 这是一种
//! “秒与分钟偏移”的自定义语法，不是标准的五段 cron，也不做日历调度。

/// 触发规格
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// 固定速率，单位毫秒
    FixedRate { millis: u64 },
    /// 两段式周期字符串，例如 `"5 1"` 表示 5 + 1*60 = 65 秒
    Period(String),
}

impl Trigger {
    /// 以毫秒为单位的固定速率触发
    pub fn fixed_rate_ms(millis: u64) -> Self {
        Self::FixedRate { millis }
    }

    /// 以周期字符串描述的触发
    pub fn period(spec: impl Into<String>) -> Self {
        Self::Period(spec.into())
    }
}
