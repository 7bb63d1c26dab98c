//! 测距指标收集模块
//!
//! 记录读数、读取错误与 sink 写入，并在内存中聚合一次运行的统计。

use std::collections::BTreeMap;

use metrics::{counter, gauge, histogram};

/// 记录一次成功读数
///
/// 每次成功解码一条记录后调用。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_reading;
///
/// let measurement = reader.read_once().await?;
/// record_reading(measurement.range_mm(), started.elapsed().as_secs_f64() * 1000.0);
/// ```
pub fn record_reading(range_mm: i32, latency_ms: f64) {
    counter!("hcsr04_readings_total").increment(1);
    gauge!("hcsr04_last_range_mm").set(range_mm as f64);
    histogram!("hcsr04_range_mm").record(range_mm as f64);
    histogram!("hcsr04_read_latency_ms").record(latency_ms);
}

/// 记录一次读取失败
///
/// `kind` 为错误类别 (open / busy / not_ready / short_read / read / decode)。
pub fn record_read_error(kind: &str) {
    counter!(
        "hcsr04_read_errors_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// 记录 sink 写入结果
pub fn record_sink_write(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "hcsr04_sink_writes_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 测距统计聚合器
///
/// 在内存中聚合一次运行的读数与错误，便于输出摘要。
#[derive(Debug, Clone, Default)]
pub struct RangeStatsAggregator {
    /// 轮询次数 (含失败)
    pub total_polls: u64,

    /// 成功读数
    pub total_readings: u64,

    /// 距离统计 (mm)
    pub range_stats: RunningStats,

    /// 读取耗时统计 (ms)
    pub latency_stats: RunningStats,

    /// 各类错误次数
    pub error_counts: BTreeMap<String, u64>,
}

impl RangeStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录成功读数
    pub fn update_reading(&mut self, range_mm: i32, latency_ms: f64) {
        self.total_polls += 1;
        self.total_readings += 1;
        self.range_stats.push(range_mm as f64);
        self.latency_stats.push(latency_ms);
    }

    /// 记录失败轮询
    pub fn update_error(&mut self, kind: &str) {
        self.total_polls += 1;
        *self.error_counts.entry(kind.to_string()).or_insert(0) += 1;
    }

    /// 失败轮询总数
    pub fn total_errors(&self) -> u64 {
        self.error_counts.values().sum()
    }

    /// 生成摘要报告
    pub fn summary(&self) -> RangeSummary {
        let total_errors = self.total_errors();
        RangeSummary {
            total_polls: self.total_polls,
            total_readings: self.total_readings,
            total_errors,
            error_rate: if self.total_polls > 0 {
                total_errors as f64 / self.total_polls as f64 * 100.0
            } else {
                0.0
            },
            range_mm: StatsSummary::from(&self.range_stats),
            latency_ms: StatsSummary::from(&self.latency_stats),
            error_counts: self.error_counts.clone(),
        }
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct RangeSummary {
    pub total_polls: u64,
    pub total_readings: u64,
    pub total_errors: u64,
    pub error_rate: f64,
    pub range_mm: StatsSummary,
    pub latency_ms: StatsSummary,
    pub error_counts: BTreeMap<String, u64>,
}

impl std::fmt::Display for RangeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Range Poll Summary ===")?;
        writeln!(f, "Polls: {}", self.total_polls)?;
        writeln!(f, "Readings: {}", self.total_readings)?;
        writeln!(
            f,
            "Failed polls: {} ({:.2}%)",
            self.total_errors, self.error_rate
        )?;
        writeln!(f, "Range (mm): {}", self.range_mm)?;
        writeln!(f, "Read latency (ms): {}", self.latency_ms)?;

        if !self.error_counts.is_empty() {
            writeln!(f, "Errors by kind:")?;
            for (kind, count) in &self.error_counts {
                writeln!(f, "  {}: {}", kind, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(value);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_counts_readings_and_errors() {
        let mut aggregator = RangeStatsAggregator::new();

        aggregator.update_reading(300, 1.5);
        aggregator.update_reading(500, 2.5);
        aggregator.update_error("not_ready");
        aggregator.update_error("not_ready");

        assert_eq!(aggregator.total_polls, 4);
        assert_eq!(aggregator.total_readings, 2);
        assert_eq!(aggregator.total_errors(), 2);
        assert_eq!(aggregator.error_counts.get("not_ready"), Some(&2));

        let summary = aggregator.summary();
        assert!((summary.range_mm.mean - 400.0).abs() < 1e-10);
        assert!((summary.error_rate - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = RangeStatsAggregator::new();
        aggregator.update_reading(300, 1.0);
        aggregator.update_error("busy");

        let output = aggregator.summary().to_string();
        assert!(output.contains("Readings: 1"));
        assert!(output.contains("50.00%"));
        assert!(output.contains("busy: 1"));
    }

    #[test]
    fn test_empty_summary_shows_na() {
        let output = RangeStatsAggregator::new().summary().to_string();
        assert!(output.contains("Range (mm): N/A"));
    }
}
