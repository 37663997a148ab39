use chrono::NaiveDate;
use usage_core::{
    AccountSelection, Category, CategoryFilter, Dimension, GRAND_TOTAL_LABEL, Granularity, Measure,
    MeasureValues, UsageRecord,
};
use usage_engine::{
    AggregationFilter, AggregationKey, AggregationRequest, DatasetSnapshot, PartitionClassifier, aggregate,
    category_summary, export_csv, filter_records, time_series_view,
};

fn record(date: &str, cluster: &str, partition: &str, user: &str, cpu: f64) -> UsageRecord {
    UsageRecord {
        timestamp: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("date"),
        account: "bio".to_string(),
        cluster: cluster.to_string(),
        user: user.to_string(),
        partition: partition.to_string(),
        measures: MeasureValues::cpu(cpu),
    }
}

fn in_account(account: &str, record: UsageRecord) -> UsageRecord {
    UsageRecord {
        account: account.to_string(),
        ..record
    }
}

fn scenario() -> DatasetSnapshot {
    DatasetSnapshot::build(
        vec![
            record("2024-01-05", "grace", "pi_bio", "alice", 10.0),
            record("2024-01-20", "grace", "scavenge_gpu", "bob", 5.0),
            record("2024-02-01", "grace", "day", "alice", 3.0),
        ],
        0,
        &PartitionClassifier::default(),
    )
}

fn bio() -> AggregationFilter {
    AggregationFilter::new(AccountSelection::One("bio".to_string()))
}

#[test]
fn monthly_category_summary_matches_worked_example() {
    let summary = category_summary(&scenario(), &bio(), Measure::CpuHours, Granularity::Month);
    assert_eq!(summary.rows.len(), 2);

    let jan = &summary.rows[0];
    assert_eq!(jan.label, "2024-01");
    assert_eq!(jan.totals.total, 15.0);
    assert_eq!(jan.totals.commons, 0.0);
    assert_eq!(jan.totals.private, 10.0);
    assert_eq!(jan.totals.scavenge, 5.0);

    let feb = &summary.rows[1];
    assert_eq!(feb.label, "2024-02");
    assert_eq!(feb.totals.total, 3.0);
    assert_eq!(feb.totals.commons, 3.0);

    assert_eq!(summary.grand_total.label, GRAND_TOTAL_LABEL);
    assert_eq!(summary.grand_total.totals.total, 18.0);
}

#[test]
fn grand_total_is_column_wise_sum() {
    let summary = category_summary(&scenario(), &bio(), Measure::CpuHours, Granularity::Month);
    let grand = summary.grand_total.totals;
    let rows = &summary.rows;
    assert_eq!(grand.total, rows.iter().map(|row| row.totals.total).sum::<f64>());
    assert_eq!(grand.commons, rows.iter().map(|row| row.totals.commons).sum::<f64>());
    assert_eq!(grand.private, rows.iter().map(|row| row.totals.private).sum::<f64>());
    assert_eq!(grand.scavenge, rows.iter().map(|row| row.totals.scavenge).sum::<f64>());
    assert_eq!(grand.total, grand.commons + grand.private + grand.scavenge);
}

#[test]
fn time_series_preserves_filtered_sum() {
    let snapshot = scenario();
    let filter = bio();
    for dimension in [Dimension::Partition, Dimension::User] {
        for granularity in [Granularity::Day, Granularity::Month] {
            let rows =
                time_series_view(&snapshot, &filter, Measure::CpuHours, granularity, dimension)
                    .expect("series");
            let view_sum: f64 = rows.iter().map(|row| row.value).sum();
            let input_sum: f64 = filter_records(&snapshot, &filter)
                .filter_map(|record| record.measure(Measure::CpuHours))
                .sum();
            assert_eq!(view_sum, input_sum);
        }
    }
}

#[test]
fn day_buckets_refine_month_buckets() {
    let snapshot = DatasetSnapshot::build(
        vec![
            record("2024-01-31", "grace", "day", "alice", 1.5),
            record("2024-01-30", "grace", "day", "alice", 2.0),
            record("2024-02-01", "grace", "day", "alice", 4.0),
        ],
        0,
        &PartitionClassifier::default(),
    );
    let request = |granularity| AggregationRequest {
        filter: bio(),
        measure: Measure::CpuHours,
        granularity,
        dimensions: vec![Dimension::User],
    };
    let days = aggregate(&snapshot, &request(Granularity::Day)).expect("days");
    let months = aggregate(&snapshot, &request(Granularity::Month)).expect("months");
    assert_eq!(days.len(), 3);
    assert_eq!(months.len(), 2);

    for (month_key, month_value) in months.iter() {
        let day_sum: f64 = days
            .iter()
            .filter(|(day_key, _)| Granularity::Month.truncate(day_key.bucket) == month_key.bucket)
            .map(|(_, value)| value)
            .sum();
        assert_eq!(day_sum, month_value);
    }
}

#[test]
fn aggregation_is_idempotent() {
    let snapshot = scenario();
    let request = AggregationRequest {
        filter: bio().with_category(CategoryFilter::All),
        measure: Measure::CpuHours,
        granularity: Granularity::Day,
        dimensions: vec![Dimension::Partition, Dimension::User],
    };
    let first = aggregate(&snapshot, &request).expect("first");
    let second = aggregate(&snapshot, &request).expect("second");
    assert_eq!(first, second);
}

#[test]
fn account_and_cluster_grouping_preserves_filtered_sum() {
    let snapshot = DatasetSnapshot::build(
        vec![
            record("2024-01-05", "grace", "pi_bio", "alice", 10.0),
            record("2024-01-09", "mccleary", "day", "alice", 2.5),
            in_account("chem", record("2024-01-20", "grace", "day", "carol", 4.0)),
            in_account("chem", record("2024-01-25", "grace", "scavenge", "carol", 1.5)),
            in_account("phys", record("2024-01-03", "grace", "day", "dave", 100.0)),
            record("2024-02-01", "grace", "day", "alice", 3.0),
        ],
        0,
        &PartitionClassifier::default(),
    );
    let accounts = AccountSelection::from_list(["bio", "chem"]).expect("accounts");
    let request = AggregationRequest {
        filter: AggregationFilter::new(accounts),
        measure: Measure::CpuHours,
        granularity: Granularity::Month,
        dimensions: vec![Dimension::Account, Dimension::Cluster],
    };
    let result = aggregate(&snapshot, &request).expect("aggregate");

    let filtered: f64 = filter_records(&snapshot, &request.filter)
        .map(|record| record.record.measures.cpu_hours)
        .sum();
    assert_eq!(filtered, 21.0);
    assert_eq!(result.total(), filtered);

    let entries: Vec<(String, &str, &str, f64)> = result
        .iter()
        .map(|(key, value)| {
            (
                key.bucket.format("%Y-%m").to_string(),
                key.values[0].as_str(),
                key.values[1].as_str(),
                value,
            )
        })
        .collect();
    assert_eq!(
        entries,
        vec![
            ("2024-01".to_string(), "bio", "grace", 10.0),
            ("2024-01".to_string(), "bio", "mccleary", 2.5),
            ("2024-01".to_string(), "chem", "grace", 5.5),
            ("2024-02".to_string(), "bio", "grace", 3.0),
        ]
    );

    let phys = AggregationKey {
        bucket: NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"),
        values: vec!["phys".to_string(), "grace".to_string()],
    };
    assert_eq!(result.get(&phys), None);
}

#[test]
fn categories_partition_the_records() {
    let snapshot = scenario();
    let total: f64 = Category::ALL
        .into_iter()
        .map(|category| {
            let filter = bio().with_category(CategoryFilter::Only(category));
            filter_records(&snapshot, &filter)
                .map(|record| record.record.measures.cpu_hours)
                .sum::<f64>()
        })
        .sum();
    assert_eq!(total, 18.0);
}

#[test]
fn export_for_one_account_two_clusters_keeps_cluster_only() {
    let snapshot = DatasetSnapshot::build(
        vec![
            record("2024-01-05", "grace", "pi_bio", "alice", 10.0),
            record("2024-01-04", "mccleary", "day", "bob", 2.5),
        ],
        0,
        &PartitionClassifier::default(),
    );
    let filter = bio();
    let csv = export_csv(filter_records(&snapshot, &filter), Measure::CpuHours).expect("csv");
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Cluster,Partition,User,CPU Hours"));
    assert_eq!(lines.next(), Some("mccleary,day,bob,2.5"));
    assert_eq!(lines.next(), Some("grace,pi_bio,alice,10.0"));
    assert_eq!(lines.next(), None);
}
