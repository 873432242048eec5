
use assert_cmd::prelude::*;
use cli_helpers::{add_trade, base_cmd, decimal_field, run_cmd, run_cmd_json, write_config};
use predicates::prelude::*;
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn setup_temp_home() -> TempDir {
    TempDir::new().expect("failed to create temp home")
}

#[test]
fn commission_small_buy_applies_minimum() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["commission", "buy", "10000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BUY commission"))
        .stdout(predicate::str::contains("$ 181,50"))
        .stdout(predicate::str::contains("$ 10.181,50"))
        .stdout(predicate::str::contains("\u{001b}[").not());
}

#[test]
fn commission_json_is_tagged_with_broker() {
    let home = setup_temp_home();
    let value = run_cmd_json(&home, &["commission", "sell", "100000"]).unwrap();

    assert_eq!(value["broker"], "galicia");
    assert_eq!(value["operation_type"], "SELL");
    assert_eq!(value["minimum_applied"], false);
    assert_eq!(decimal_field(&value, "base_commission").unwrap(), dec!(500));
    assert_eq!(decimal_field(&value, "iva_amount").unwrap(), dec!(105));
    assert_eq!(decimal_field(&value, "total_commission").unwrap(), dec!(605));
    assert_eq!(decimal_field(&value, "net_amount").unwrap(), dec!(99395));
}

#[test]
fn commission_rejects_negative_amount() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["commission", "buy", "-100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be negative"));
}

#[test]
fn commission_rejects_unknown_operation_and_broker() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["commission", "hold", "1000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("buy"));

    base_cmd(&home)
        .args(["commission", "buy", "1000", "--broker", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broker not found: nowhere"));
}

#[test]
fn custody_exempt_and_charged() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["custody", "800000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no custody fee"));

    let value = run_cmd_json(&home, &["custody", "2000000"]).unwrap();
    assert_eq!(value["is_exempt"], false);
    assert_eq!(decimal_field(&value, "applicable_amount").unwrap(), dec!(1000000));
    assert_eq!(decimal_field(&value, "monthly_fee").unwrap(), dec!(2500));
    assert_eq!(decimal_field(&value, "iva_amount").unwrap(), dec!(525));
    assert_eq!(decimal_field(&value, "total_monthly_cost").unwrap(), dec!(3025));
    assert_eq!(decimal_field(&value, "annual_fee").unwrap(), dec!(36300));
}

#[test]
fn break_even_round_trip_costs() {
    let home = setup_temp_home();
    let value = run_cmd_json(&home, &["break-even", "100000", "--months", "12"]).unwrap();

    assert_eq!(value["months"], 12);
    assert_eq!(decimal_field(&value, "total_custody").unwrap(), dec!(0));
    assert_eq!(decimal_field(&value, "total_cost").unwrap(), dec!(1210));
    assert_eq!(decimal_field(&value, "break_even_pct").unwrap(), dec!(1.21));
    assert_eq!(value["monthly"].as_array().map(Vec::len), Some(12));

    let no_exit = run_cmd_json(&home, &["break-even", "100000", "--no-exit"]).unwrap();
    assert!(no_exit["exit"].is_null());
    assert_eq!(decimal_field(&no_exit, "total_cost").unwrap(), dec!(605));
}

#[test]
fn break_even_uses_config_defaults() {
    let home = setup_temp_home();
    write_config(&home, "default_months = 3\n").unwrap();

    let value = run_cmd_json(&home, &["break-even", "50000"]).unwrap();
    assert_eq!(value["months"], 3);
}

#[test]
fn break_even_rejects_total_loss_growth() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["break-even", "100000", "--growth", "-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("growth must be greater than -1"));
}

#[test]
fn optimize_reports_threshold_and_candidates() {
    let home = setup_temp_home();
    let value = run_cmd_json(
        &home,
        &["optimize", "--step", "10000", "--max", "100000", "--target-pct", "1.5"],
    )
    .unwrap();

    assert_eq!(value["candidates"].as_array().map(Vec::len), Some(10));
    assert_eq!(decimal_field(&value, "buy_minimum_threshold").unwrap(), dec!(30000));
    let smallest = &value["smallest_within_target"];
    assert_eq!(decimal_field(smallest, "amount").unwrap(), dec!(30000));

    base_cmd(&home)
        .args(["optimize", "--step", "1", "--max", "2000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("larger step"));
}

#[test]
fn brokers_list_shows_seeded_preset() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["brokers", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("galicia"))
        .stdout(predicate::str::contains("0,5%"));
}

#[test]
fn brokers_set_then_use_via_env() {
    let home = setup_temp_home();
    run_cmd(
        &home,
        &["brokers", "set", "Cocos", "--buy-pct", "0.001", "--buy-min", "0"],
    )
    .unwrap();

    let shown = run_cmd_json(&home, &["brokers", "show", "cocos"]).unwrap();
    assert_eq!(shown["broker"], "cocos");
    assert_eq!(decimal_field(&shown["buy"], "percentage").unwrap(), dec!(0.001));
    assert_eq!(decimal_field(&shown["sell"], "minimum").unwrap(), dec!(150));

    let output = base_cmd(&home)
        .env("CEDEARS_BROKER", "cocos")
        .args(["--json", "commission", "buy", "10000"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["broker"], "cocos");
    assert_eq!(decimal_field(&value, "base_commission").unwrap(), dec!(10));
    assert_eq!(decimal_field(&value, "total_commission").unwrap(), dec!(12.1));
}

#[test]
fn brokers_set_rejects_invalid_rate() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["brokers", "set", "galicia", "--sell-pct", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sell percentage"));
}

#[test]
fn brokers_import_from_file() {
    let home = setup_temp_home();
    let file = home.path().join("brokers.toml");
    std::fs::write(
        &file,
        r#"
[[broker]]
broker = "balanz"
buy = { percentage = "0.006", minimum = "100", iva = "0.21" }
sell = { percentage = "0.006", minimum = "100", iva = "0.21" }
custody = { exempt_amount = "0", monthly_percentage = "0.001", monthly_minimum = "0", iva = "0.21" }
"#,
    )
    .unwrap();

    base_cmd(&home)
        .args(["brokers", "import"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 broker(s)"));

    let conn = sqlite_helpers::open_conn(&home).unwrap();
    assert_eq!(
        sqlite_helpers::list_brokers(&conn).unwrap(),
        vec!["balanz".to_string(), "galicia".to_string()]
    );
}

#[test]
fn trades_add_list_and_protect_broker() {
    let home = setup_temp_home();

    let trade = add_trade(&home, "aapl", "buy", "20", "500", "2025-03-10").unwrap();
    assert_eq!(trade["ticker"], "AAPL");
    assert_eq!(decimal_field(&trade, "total_commission").unwrap(), dec!(181.5));

    add_trade(&home, "MSFT", "venta", "10", "10000", "2025-03-15").unwrap();

    let listed = run_cmd_json(&home, &["trades", "list", "--ticker", "aapl"]).unwrap();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    base_cmd(&home)
        .args(["brokers", "delete", "galicia"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be deleted"));

    let conn = sqlite_helpers::open_conn(&home).unwrap();
    assert_eq!(sqlite_helpers::count_trades(&conn).unwrap(), 2);
}

#[test]
fn trades_list_empty() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["trades", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No trades found"));
}

#[test]
fn trades_add_rejects_bad_date() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["trades", "add", "AAPL", "buy", "1", "100", "10/03/2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

#[test]
fn report_commissions_json_and_export() {
    let home = setup_temp_home();
    add_trade(&home, "AAPL", "buy", "20", "500", "2025-01-10").unwrap();
    add_trade(&home, "AAPL", "sell", "200", "500", "2025-02-10").unwrap();
    add_trade(&home, "KO", "buy", "1", "1000", "2024-12-31").unwrap();

    let report = run_cmd_json(&home, &["report", "commissions", "2025"]).unwrap();
    assert_eq!(report["year"], 2025);
    assert_eq!(report["monthly_summaries"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        decimal_field(&report, "annual_total_commission").unwrap(),
        dec!(786.5)
    );

    base_cmd(&home)
        .args(["report", "commissions", "2025", "--export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Report exported to"));

    let csv = std::fs::read_to_string(home.path().join("commissions_report_2025.csv")).unwrap();
    assert!(csv.starts_with("Mes,Compras,Ventas"));
    assert!(csv.contains("Enero,1,0,10000.00"));
    assert!(csv.contains("TOTAL ANUAL,1,1,110000.00"));
}

#[test]
fn report_commissions_empty_year() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["report", "commissions", "2030"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No trades found for year 2030"));
}

#[test]
fn break_even_runaway_growth_fails_cleanly() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["break-even", "100000", "--months", "240", "--growth", "0.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("projected position exceeds"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn break_even_rejects_huge_month_count() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["--json", "break-even", "100000", "--months", "4000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("months must be at most 1200"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn break_even_longest_horizon_succeeds() {
    let home = setup_temp_home();
    let value = run_cmd_json(
        &home,
        &["break-even", "5000000", "--months", "1200", "--growth", "0.001"],
    )
    .unwrap();

    assert_eq!(value["monthly"].as_array().map(Vec::len), Some(1200));
    assert!(decimal_field(&value, "total_custody").unwrap() > dec!(0));
}

#[test]
fn optimize_runaway_growth_fails_cleanly() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["optimize", "--months", "600", "--growth", "0.5", "--max", "100000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation error"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn amounts_above_limit_are_rejected() {
    let home = setup_temp_home();

    for args in [
        vec!["commission", "buy", "79228162514264337593543950335"],
        vec!["custody", "79228162514264337593543950335"],
        vec!["break-even", "1000000000000000000"],
    ] {
        base_cmd(&home)
            .args(&args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot exceed"))
            .stderr(predicate::str::contains("panicked").not());
    }
}

#[test]
fn trades_add_rejects_oversized_and_malformed_values() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args([
            "trades",
            "add",
            "AAPL",
            "buy",
            "79228162514264337593543950335",
            "2",
            "2025-03-10",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("trade amount"))
        .stderr(predicate::str::contains("panicked").not());

    base_cmd(&home)
        .args(["trades", "add", "AAPL", "buy", "ten", "100", "2025-03-10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse error: invalid quantity 'ten'"));
}
