// ============================================================================
// 有界分批并发执行器
// 输入按 batch_size 切块，每块内的条目在专用 rayon 线程池上并发处理，
// 整块全部完成后才开始下一块（同步屏障），不是工作窃取式的全局调度。
// ============================================================================

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::utils::error::{AppError, AppResult};

/// 分批执行器，持有一个大小为 batch_size 的线程池
pub struct BatchRunner {
    pool: ThreadPool,
    batch_size: usize,
}

impl BatchRunner {
    /// 创建执行器，线程数与批大小均为 `workers`
    pub fn new(workers: usize) -> AppResult<Self> {
        if workers == 0 {
            return Err(AppError::ConfigError("并发数必须大于 0".to_string()));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("completer-worker-{}", i))
            .build()
            .map_err(|e| AppError::ConfigError(format!("线程池创建失败：{}", e)))?;
        Ok(Self {
            pool,
            batch_size: workers,
        })
    }

    /// 分批处理 `items`，返回按输入顺序排列的结果和实际执行的批次数
    ///
    /// 各条目之间只读共享，结果由调用方在 join 之后按唯一键合并。
    pub fn run<T, R, F>(&self, items: &[T], f: F) -> (Vec<R>, usize)
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        let mut results = Vec::with_capacity(items.len());
        let mut batches = 0;

        for chunk in items.chunks(self.batch_size) {
            let part: Vec<R> = self.pool.install(|| chunk.par_iter().map(&f).collect());
            results.extend(part);
            batches += 1;
        }

        (results, batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[test]
    fn test_run_preserves_input_order() {
        let runner = BatchRunner::new(3).unwrap();
        let items: Vec<usize> = (0..10).collect();
        let (results, batches) = runner.run(&items, |n| n * 2);
        assert_eq!(results, (0..10).map(|n| n * 2).collect::<Vec<_>>());
        assert_eq!(batches, 4);
    }

    #[test]
    fn test_run_empty_input() {
        let runner = BatchRunner::new(4).unwrap();
        let items: Vec<u8> = Vec::new();
        let (results, batches) = runner.run(&items, |b| *b);
        assert!(results.is_empty());
        assert_eq!(batches, 0);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(BatchRunner::new(0).is_err());
    }

    #[test]
    fn test_concurrency_bounded_by_batch_size() {
        let runner = BatchRunner::new(2).unwrap();
        let current = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let items: Vec<usize> = (0..8).collect();

        runner.run(&items, |_| {
            let now = current.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(10));
            current.fetch_sub(1, Ordering::SeqCst);
        });

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_each_batch_joins_before_next() {
        let runner = BatchRunner::new(2).unwrap();
        let log: Mutex<Vec<(usize, &'static str)>> = Mutex::new(Vec::new());
        let items: Vec<usize> = (0..4).collect();

        runner.run(&items, |n| {
            log.lock().unwrap().push((n / 2, "start"));
            std::thread::sleep(Duration::from_millis(5));
            log.lock().unwrap().push((n / 2, "end"));
        });

        // 第二批的任何 start 都必须出现在第一批全部 end 之后
        let log = log.into_inner().unwrap();
        let last_first_end = log
            .iter()
            .rposition(|(batch, ev)| *batch == 0 && *ev == "end")
            .unwrap();
        let first_second_start = log
            .iter()
            .position(|(batch, ev)| *batch == 1 && *ev == "start")
            .unwrap();
        assert!(last_first_end < first_second_start);
    }
}
