//! Static chart page generation
//!
//! Emits one self-contained HTML page per window with four bar charts
//! (top combinations, blades, ratchets, bits) rendered by Chart.js from a
//! CDN, plus a landing page linking the per-window pages. Labels and data
//! are JSON-encoded so names survive quoting.

use serde_json::json;

use super::summary::ComponentCounts;

/// How many entries each chart shows
const TOP_N: usize = 10;

fn top_labels_data(items: &[(String, usize)]) -> (String, String) {
    let top = &items[..items.len().min(TOP_N)];
    let labels: Vec<&str> = top.iter().map(|(name, _)| name.as_str()).collect();
    let data: Vec<usize> = top.iter().map(|(_, count)| *count).collect();
    (json!(labels).to_string(), json!(data).to_string())
}

fn chart_script(canvas_id: &str, labels: &str, data: &str, color: &str) -> String {
    format!(
        r#"        new Chart(document.getElementById('{canvas_id}'), {{
            ...chartConfig,
            data: {{
                labels: {labels},
                datasets: [{{
                    label: 'Count',
                    data: {data},
                    backgroundColor: 'rgba({color}, 0.5)',
                    borderColor: 'rgba({color}, 1)',
                    borderWidth: 1
                }}]
            }}
        }});"#
    )
}

/// Render the chart page for one window
pub fn charts_html(
    title: &str,
    timestamp: &str,
    combos: &[((String, String, String), usize)],
    counts: &ComponentCounts,
) -> String {
    let combo_items: Vec<(String, usize)> = combos
        .iter()
        .map(|((blade, ratchet, bit), count)| {
            (format!("{} {} {}", blade, ratchet, bit), *count)
        })
        .collect();

    let (combo_labels, combo_data) = top_labels_data(&combo_items);
    let (blade_labels, blade_data) = top_labels_data(&counts.blades);
    let (ratchet_labels, ratchet_data) = top_labels_data(&counts.ratchets);
    let (bit_labels, bit_data) = top_labels_data(&counts.bits);

    let scripts = [
        chart_script("comboChart", &combo_labels, &combo_data, "153, 102, 255"),
        chart_script("bladeChart", &blade_labels, &blade_data, "54, 162, 235"),
        chart_script("ratchetChart", &ratchet_labels, &ratchet_data, "255, 99, 132"),
        chart_script("bitChart", &bit_labels, &bit_data, "75, 192, 192"),
    ]
    .join("\n\n");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 1400px; margin: 0 auto; padding: 20px; background-color: #f5f5f5; }}
        h1 {{ text-align: center; color: #333; margin-bottom: 10px; }}
        .timestamp {{ text-align: center; color: #666; font-size: 14px; margin-bottom: 30px; }}
        .chart-container {{ background: white; border-radius: 8px; padding: 20px; margin: 20px 0; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        .chart-wrapper {{ position: relative; height: 400px; }}
        h2 {{ color: #555; margin-top: 0; }}
    </style>
</head>
<body>
    <h1>{title} - Top {top_n} Statistics</h1>
    <div class="timestamp">Generated: {timestamp}</div>

    <div class="chart-container">
        <h2>Most Used Full Combinations</h2>
        <div class="chart-wrapper"><canvas id="comboChart"></canvas></div>
    </div>
    <div class="chart-container">
        <h2>Most Used Blades</h2>
        <div class="chart-wrapper"><canvas id="bladeChart"></canvas></div>
    </div>
    <div class="chart-container">
        <h2>Most Used Ratchets</h2>
        <div class="chart-wrapper"><canvas id="ratchetChart"></canvas></div>
    </div>
    <div class="chart-container">
        <h2>Most Used Bits</h2>
        <div class="chart-wrapper"><canvas id="bitChart"></canvas></div>
    </div>

    <script>
        const chartConfig = {{
            type: 'bar',
            options: {{
                responsive: true,
                maintainAspectRatio: false,
                plugins: {{ legend: {{ display: false }} }},
                scales: {{ y: {{ beginAtZero: true, ticks: {{ stepSize: 1 }} }} }}
            }}
        }};

{scripts}
    </script>
</body>
</html>
"#,
        title = title,
        timestamp = timestamp,
        top_n = TOP_N,
        scripts = scripts,
    )
}

/// Render the landing page linking each generated chart page
pub fn landing_html(entries: &[(String, String)], timestamp: &str) -> String {
    let links = entries
        .iter()
        .map(|(title, file)| format!(r#"        <li><a href="{}">{}</a></li>"#, file, title))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Winning Combinations</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 600px; margin: 40px auto; padding: 20px; }}
        h1 {{ color: #333; }}
        li {{ margin: 8px 0; font-size: 18px; }}
        .timestamp {{ color: #666; font-size: 14px; }}
    </style>
</head>
<body>
    <h1>Winning Combinations</h1>
    <div class="timestamp">Generated: {timestamp}</div>
    <ul>
{links}
    </ul>
</body>
</html>
"#,
        timestamp = timestamp,
        links = links,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts() -> ComponentCounts {
        ComponentCounts {
            blades: vec![("PhoenixWing".to_string(), 3), ("DranSword".to_string(), 1)],
            ratchets: vec![("9-60".to_string(), 4)],
            bits: vec![("GF".to_string(), 2), ("F".to_string(), 2)],
        }
    }

    #[test]
    fn test_charts_html_embeds_labels_and_data() {
        let combos = vec![(
            (
                "PhoenixWing".to_string(),
                "9-60".to_string(),
                "GF".to_string(),
            ),
            3,
        )];
        let html = charts_html("Last 30 Days", "08-01-2026", &combos, &counts());

        assert!(html.contains("Last 30 Days"));
        assert!(html.contains(r#"["PhoenixWing 9-60 GF"]"#));
        assert!(html.contains(r#"["PhoenixWing","DranSword"]"#));
        assert!(html.contains("[3,1]"));
        assert!(html.contains("Generated: 08-01-2026"));
    }

    #[test]
    fn test_charts_html_caps_at_top_ten() {
        let blades: Vec<(String, usize)> =
            (0..15).map(|i| (format!("Blade{}", i), 15 - i)).collect();
        let counts = ComponentCounts {
            blades,
            ..ComponentCounts::default()
        };
        let html = charts_html("Year to Date", "08-01-2026", &[], &counts);

        assert!(html.contains("Blade9"));
        assert!(!html.contains("Blade10"));
    }

    #[test]
    fn test_landing_links_each_window() {
        let entries = vec![
            ("Last 30 Days".to_string(), "30days_charts.html".to_string()),
            ("Year to Date".to_string(), "ytd_charts.html".to_string()),
        ];
        let html = landing_html(&entries, "08-01-2026");

        assert!(html.contains(r#"href="30days_charts.html""#));
        assert!(html.contains(r#"href="ytd_charts.html""#));
    }
}
