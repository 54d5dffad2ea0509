use sa_domain::config::{Config, ConfigSeverity};

/// Run all diagnostic checks and print a summary.
///
/// Returns `Ok(true)` when every check passes, `Ok(false)` when at least
/// one check failed.
pub async fn run(config: &Config, config_path: &str) -> anyhow::Result<bool> {
    println!("sa-gateway doctor");
    println!("=================\n");

    let mut all_passed = true;

    // 1. Config file
    check_config_file(config_path, &mut all_passed);

    // 2. Config validation
    check_config_validation(config, &mut all_passed);

    // 3. Local catalog endpoints
    check_catalog_endpoints(config, &mut all_passed);

    // 4. Local base URL reachability (only when the catalog actually
    // needs it — relative route templates)
    check_local_base_url(config, &mut all_passed).await;

    // 5. Gateway upstreams reachable
    check_gateway_upstreams(config, &mut all_passed).await;

    // Summary
    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    Ok(all_passed)
}

// ── Individual checks ─────────────────────────────────────────────────

fn check_config_file(config_path: &str, all_passed: &mut bool) {
    let exists = std::path::Path::new(config_path).exists();
    print_check(
        "Config file exists",
        exists,
        if exists {
            config_path.to_owned()
        } else {
            format!("{config_path} not found (using defaults)")
        },
    );
    if !exists {
        *all_passed = false;
    }
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();

    if issues.is_empty() {
        print_check("Config validation", true, "no issues".into());
    } else {
        print_check(
            "Config validation",
            error_count == 0,
            format!("{} issue(s) ({} error(s))", issues.len(), error_count),
        );
        for issue in &issues {
            println!("      {issue}");
        }
        if error_count > 0 {
            *all_passed = false;
        }
    }
}

fn check_catalog_endpoints(config: &Config, all_passed: &mut bool) {
    let count = config.catalog.endpoints.len();
    let ok = count > 0;

    print_check(
        "Local catalog endpoints configured",
        ok,
        if ok {
            format!("{count} endpoint(s)")
        } else {
            "none configured (local tools/list will be empty)".into()
        },
    );

    if !ok {
        *all_passed = false;
    }
}

async fn check_local_base_url(config: &Config, all_passed: &mut bool) {
    let Some(url) = &config.executor.local_base_url else {
        print_check(
            "Local base URL reachable",
            true,
            "not configured, skipped".into(),
        );
        return;
    };

    let reachable = match reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
    {
        Ok(client) => client.get(url).send().await.is_ok(),
        Err(_) => false,
    };

    print_check(
        "Local base URL reachable",
        reachable,
        if reachable {
            url.clone()
        } else {
            format!("{url} (unreachable)")
        },
    );

    if !reachable {
        *all_passed = false;
    }
}

async fn check_gateway_upstreams(config: &Config, all_passed: &mut bool) {
    let upstreams = &config.gateway.upstreams;
    if upstreams.is_empty() {
        print_check(
            "Gateway upstreams reachable",
            true,
            "none configured, skipped".into(),
        );
        return;
    }

    let aggregator = sa_mcp_client::GatewayAggregator::new(config.gateway.clone());
    let snapshot = aggregator.build_snapshot().await;
    let healthy = snapshot.healthy_upstream_count();
    let total = upstreams.iter().filter(|u| u.enabled).count();
    let ok = healthy == total;

    print_check(
        "Gateway upstreams reachable",
        ok,
        format!("{healthy}/{total} healthy"),
    );

    for status in snapshot.upstream_status.values() {
        if !status.healthy {
            println!(
                "      [FAIL] {}: {}",
                status.upstream_name,
                status.last_error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if !ok {
        *all_passed = false;
    }
}

// ── Formatting helper ─────────────────────────────────────────────────

fn print_check(name: &str, passed: bool, detail: String) {
    let status = if passed { "PASS" } else { "FAIL" };
    println!("  [{status}] {name}: {detail}");
}
