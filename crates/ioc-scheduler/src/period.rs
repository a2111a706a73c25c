//! 触发规格换算
//!
//! 调度器以整秒为最小粒度。固定毫秒频率按整除换算为秒；
//! 周期表达式使用“秒 分”两段语法：`"S M"` 表示每 `S + M*60` 秒
//! 触发一次（这不是 cron，没有日期字段和通配符）。

use ioc_common::{ContainerError, ContainerResult, Trigger};

/// 把触发规格换算为秒级周期
///
/// 换算结果为零（毫秒值不足一秒、或表达式为 `"0 0"`）视为
/// 非法规格，报 [`ContainerError::InvalidPeriodFormat`]。
pub fn period_seconds(trigger: &Trigger) -> ContainerResult<u64> {
    let seconds = match trigger {
        Trigger::FixedRate { millis } => millis / 1000,
        Trigger::Period(spec) => parse_period(spec)?,
    };

    if seconds == 0 {
        return Err(ContainerError::InvalidPeriodFormat {
            value: describe(trigger),
        });
    }
    Ok(seconds)
}

/// 解析“秒 分”周期表达式
///
/// 必须恰好两个以空白分隔的非负整数，任何偏离都是格式错误。
fn parse_period(spec: &str) -> ContainerResult<u64> {
    let invalid = || ContainerError::InvalidPeriodFormat {
        value: spec.to_string(),
    };

    let tokens: Vec<&str> = spec.split_whitespace().collect();
    let [seconds, minutes] = tokens.as_slice() else {
        return Err(invalid());
    };

    let seconds: u64 = seconds.parse().map_err(|_| invalid())?;
    let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
    Ok(seconds + minutes * 60)
}

fn describe(trigger: &Trigger) -> String {
    match trigger {
        Trigger::FixedRate { millis } => format!("fixedRate={millis}ms"),
        Trigger::Period(spec) => spec.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rate_is_truncated_to_whole_seconds() {
        assert_eq!(period_seconds(&Trigger::fixed_rate_ms(5000)).unwrap(), 5);
        assert_eq!(period_seconds(&Trigger::fixed_rate_ms(5999)).unwrap(), 5);
    }

    #[test]
    fn sub_second_fixed_rate_is_rejected() {
        let err = period_seconds(&Trigger::fixed_rate_ms(999)).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidPeriodFormat { .. }));
    }

    #[test]
    fn period_expression_adds_seconds_and_minutes() {
        assert_eq!(period_seconds(&Trigger::period("5 1")).unwrap(), 65);
        assert_eq!(period_seconds(&Trigger::period("0 2")).unwrap(), 120);
        assert_eq!(period_seconds(&Trigger::period("30 0")).unwrap(), 30);
    }

    #[test]
    fn malformed_period_expressions_are_rejected() {
        for spec in ["", "5", "5 1 2", "abc 1", "5 abc", "-5 1", "5.0 1"] {
            let err = period_seconds(&Trigger::period(spec)).unwrap_err();
            assert!(
                matches!(err, ContainerError::InvalidPeriodFormat { .. }),
                "表达式 {spec:?} 应判为格式错误"
            );
        }
    }

    #[test]
    fn zero_total_period_is_rejected() {
        let err = period_seconds(&Trigger::period("0 0")).unwrap_err();
        assert!(matches!(err, ContainerError::InvalidPeriodFormat { .. }));
    }
}
