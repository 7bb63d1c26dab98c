//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（无需真实传感器）
//! - 基于临时文件的字符设备测试

#[cfg(test)]
mod contract_tests {
    use contracts::{ByteOrder, ConfigVersion, RangerBlueprint, RECORD_LEN};

    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = ConfigVersion::V1;
        assert_eq!(RECORD_LEN, 4);
    }

    #[test]
    fn test_default_blueprint_matches_demo() {
        let blueprint = RangerBlueprint::default();
        assert_eq!(blueprint.device.path.to_str(), Some("/dev/hc-sr04"));
        assert_eq!(blueprint.device.byte_order, ByteOrder::Native);
        assert_eq!(blueprint.poll.reading_limit(), None);
        assert_eq!(blueprint.effective_sinks().len(), 1);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::io::Write;

    use contracts::{ByteOrder, DataSink, ErrorPolicy, SinkConfig, SinkType};
    use dispatcher::{create_dispatcher, ConsoleSink};
    use ingestion::{
        CharDevice, IngestionError, MockRangeDevice, MockResponse, PollerConfig, RangePoller,
        RangeReader, StopReason,
    };
    use tokio::sync::watch;

    fn limit(n: u64) -> PollerConfig {
        PollerConfig {
            max_readings: Some(n),
            ..Default::default()
        }
    }

    /// 写入一条记录的临时 "设备" 文件
    fn device_file(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    /// End-to-end test: MockRangeDevice -> RangePoller -> Dispatcher(file + log)
    ///
    /// 验证完整的数据流：
    /// 1. MockRangeDevice 按脚本返回记录
    /// 2. RangePoller 每次打开、读取 4 字节、关闭
    /// 3. Dispatcher 将读数按顺序写入所有 sinks
    #[tokio::test]
    async fn test_e2e_mock_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("ranges.jsonl");

        let sink_configs = vec![
            SinkConfig {
                name: "test_log".to_string(),
                sink_type: SinkType::Log,
                params: HashMap::new(),
            },
            SinkConfig {
                name: "test_file".to_string(),
                sink_type: SinkType::File,
                params: HashMap::from([(
                    "path".to_string(),
                    out_path.display().to_string(),
                )]),
            },
        ];
        let mut dispatcher = create_dispatcher(sink_configs).unwrap();

        let device = MockRangeDevice::with_ranges([120, 340, -1, 4000]);
        let device_stats = device.stats();
        let poller = RangePoller::new(RangeReader::new(device, ByteOrder::Native), limit(4));

        let (_tx, rx) = watch::channel(false);
        let stats = poller.run(&mut dispatcher, rx).await.unwrap();
        dispatcher.close().await.unwrap();

        // Verify poll stats
        assert_eq!(stats.readings, 4);
        assert_eq!(stats.stop_reason, StopReason::LimitReached);
        assert_eq!(dispatcher.dispatched(), 4);

        // Verify device accounting
        assert_eq!(device_stats.opens(), 4);
        assert_eq!(device_stats.closes(), 4);
        assert_eq!(device_stats.max_open(), 1);
        assert_eq!(device_stats.bytes_read(), 16);

        // Verify the file sink contents
        let content = std::fs::read_to_string(&out_path).unwrap();
        let ranges: Vec<i64> = content
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["measurement"].as_i64().unwrap()
            })
            .collect();
        assert_eq!(ranges, vec![120, 340, -1, 4000]);

        // Verify per-sink metrics
        for (name, snapshot) in dispatcher.metrics() {
            assert_eq!(snapshot.write_count, 4, "sink {}", name);
            assert_eq!(snapshot.failure_count, 0, "sink {}", name);
        }
    }

    /// 临时文件充当字符设备：`2C 01 00 00` 小端解码为 300
    #[tokio::test]
    async fn test_e2e_char_device_little_endian() {
        let file = device_file(&[0x2C, 0x01, 0x00, 0x00]);
        let reader = RangeReader::new(CharDevice::new(file.path()), ByteOrder::Little);
        let poller = RangePoller::new(reader, limit(2));

        let (_tx, rx) = watch::channel(false);
        let mut console = ConsoleSink::new("console", Vec::new());
        let stats = poller.run(&mut console, rx).await.unwrap();

        assert_eq!(stats.readings, 2);
        let output = String::from_utf8(console.into_inner()).unwrap();
        assert_eq!(
            output,
            "Measured range in mm: 300\nMeasured range in mm: 300\n"
        );
    }

    /// Big-endian record read from the same device path
    #[tokio::test]
    async fn test_e2e_char_device_big_endian() {
        let file = device_file(&[0x00, 0x00, 0x01, 0x2C]);
        let reader = RangeReader::new(CharDevice::new(file.path()), ByteOrder::Big);

        let measurement = reader.read_once().await.unwrap();
        assert_eq!(measurement.range_mm(), 300);
    }

    /// 记录长度不足 4 字节时在默认策略下终止，且不输出任何读数
    #[tokio::test]
    async fn test_e2e_short_record_aborts() {
        let file = device_file(&[0x2C, 0x01, 0x00]);
        let reader = RangeReader::new(CharDevice::new(file.path()), ByteOrder::Little);
        let poller = RangePoller::new(reader, PollerConfig::default());

        let (_tx, rx) = watch::channel(false);
        let mut console = ConsoleSink::new("console", Vec::new());
        let err = poller.run(&mut console, rx).await.unwrap_err();

        assert!(matches!(
            err,
            IngestionError::ShortRead {
                expected: 4,
                got: 3,
                ..
            }
        ));
        assert!(console.into_inner().is_empty());
    }

    /// Missing device node fails at open
    #[tokio::test]
    async fn test_e2e_missing_device() {
        let dir = tempfile::tempdir().unwrap();
        let reader = RangeReader::new(
            CharDevice::new(dir.path().join("hc-sr04")),
            ByteOrder::Native,
        );
        let poller = RangePoller::new(reader, PollerConfig::default());

        let (_tx, rx) = watch::channel(false);
        let mut console = ConsoleSink::new("console", Vec::new());
        let err = poller.run(&mut console, rx).await.unwrap_err();

        assert!(matches!(err, IngestionError::DeviceOpen { .. }));
        assert_eq!(err.kind(), "open");
    }

    /// skip 策略：失败的轮询不输出，后续读数继续输出
    #[tokio::test]
    async fn test_e2e_skip_policy_from_config() {
        let blueprint = config_loader::ConfigLoader::load_from_str(
            r#"
            [poll]
            on_error = "skip"
            max_readings = 2
            "#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(blueprint.poll.on_error, ErrorPolicy::Skip);

        let device = MockRangeDevice::new(vec![
            MockResponse::bytes([0x01, 0x02]),
            MockResponse::range(150),
            MockResponse::ReadError(std::io::ErrorKind::WouldBlock),
            MockResponse::range(155),
        ]);
        let poller = RangePoller::new(
            RangeReader::new(device, blueprint.device.byte_order),
            PollerConfig::from(&blueprint.poll),
        );

        let (_tx, rx) = watch::channel(false);
        let mut console = ConsoleSink::new("console", Vec::new());
        let stats = poller.run(&mut console, rx).await.unwrap();

        assert_eq!(stats.readings, 2);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.range_stats.error_counts.get("short_read"), Some(&1));
        assert_eq!(stats.range_stats.error_counts.get("not_ready"), Some(&1));

        let output = String::from_utf8(console.into_inner()).unwrap();
        assert_eq!(
            output,
            "Measured range in mm: 150\nMeasured range in mm: 155\n"
        );
    }

    /// Shutdown while the poller sleeps ends the run cleanly
    #[tokio::test]
    async fn test_e2e_shutdown_signal() {
        let device = MockRangeDevice::with_ranges(0..1000);
        let poller = RangePoller::new(
            RangeReader::new(device, ByteOrder::Native),
            PollerConfig::default(),
        );

        let (tx, rx) = watch::channel(false);
        let stopper = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(250)).await;
            tx.send(true).unwrap();
        });

        let mut console = ConsoleSink::new("console", Vec::new());
        let stats = poller.run(&mut console, rx).await.unwrap();
        stopper.await.unwrap();

        assert_eq!(stats.stop_reason, StopReason::Shutdown);
        assert!(stats.readings >= 1 && stats.readings <= 4);
    }
}
