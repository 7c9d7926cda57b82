//! 徽章指标
//!
//! 基于 metrics crate 记录徽章评估与持有者统计指标。
//! 未安装 recorder 时所有记录均为空操作。

/// 注册徽章相关指标的描述信息
pub fn describe_badge_metrics() {
    metrics::describe_counter!(
        "badge_evaluations_total",
        "Total number of badge evaluations per provider"
    );
    metrics::describe_counter!("badge_grants_total", "Total number of badges granted");
    metrics::describe_counter!(
        "bearer_count_queries_total",
        "Total number of bearer count queries"
    );
    metrics::describe_histogram!(
        "bearer_count_duration_seconds",
        "Bearer count query duration in seconds"
    );
}

/// 记录一次徽章评估及其发放数量
#[inline]
pub fn record_badge_evaluation(namespace: &str, granted: usize) {
    metrics::counter!(
        "badge_evaluations_total",
        "namespace" => namespace.to_string()
    )
    .increment(1);

    if granted == 0 {
        return;
    }
    metrics::counter!(
        "badge_grants_total",
        "namespace" => namespace.to_string()
    )
    .increment(granted as u64);
}

/// 记录一次持有者统计
#[inline]
pub fn record_bearer_count(namespace: &str, badge: &str, duration_secs: f64) {
    metrics::counter!(
        "bearer_count_queries_total",
        "namespace" => namespace.to_string(),
        "badge" => badge.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "bearer_count_duration_seconds",
        "namespace" => namespace.to_string(),
        "badge" => badge.to_string()
    )
    .record(duration_secs);
}
