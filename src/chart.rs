//! HTML chart export of the collected resident-size history.
//!
//! The page embeds the series as JSON and leaves drawing to plotly.js in the
//! browser; nothing is rendered here.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::history::History;
use crate::output::TIME_FORMAT;

const PLOTLY_URL: &str = "https://cdn.plot.ly/plotly-latest.min.js";

/// One plotly trace.
#[derive(Serialize)]
struct Trace {
    x: Vec<String>,
    y: Vec<f64>,
    name: String,
    #[serde(rename = "type")]
    kind: &'static str,
    mode: &'static str,
}

fn traces(history: &History) -> Vec<Trace> {
    history
        .iter()
        .map(|(pid, series)| Trace {
            x: series
                .times
                .iter()
                .map(|t| t.format(TIME_FORMAT).to_string())
                .collect(),
            y: series.rss.clone(),
            name: pid.to_string(),
            kind: "scatter",
            mode: "lines+markers",
        })
        .collect()
}

/// Builds a standalone HTML page plotting RSS over time, one line per pid.
pub fn render_html(history: &History) -> Result<String, serde_json::Error> {
    // "</" inside a script block would end it early.
    let data = serde_json::to_string(&traces(history))?.replace("</", "<\\/");
    let title = format!("RSS ({})", history.unit().suffix());
    let yaxis = y_axis(&title, history.max());

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>pmon</title>
    <script src="{PLOTLY_URL}"></script>
</head>
<body>
    <div id="graph"></div>
    <script>
        let data = {data};

        let layout = {{
            autosize: true,
            width: 780,
            height: 580,
            title: "{title}",
            xaxis: {{ title: "time" }},
            yaxis: {yaxis}
        }};

        Plotly.newPlot('graph', data, layout);
    </script>
</body>
</html>
"#
    ))
}

/// Y axis from zero to a quarter above the largest value.
fn y_axis(title: &str, max: f64) -> String {
    if max > 0.0 {
        format!("{{ title: \"{title}\", range: [0, {}] }}", max * 1.25)
    } else {
        format!("{{ title: \"{title}\", rangemode: \"tozero\" }}")
    }
}

/// Renders the chart and writes it to `path`.
pub fn write_html(history: &History, path: &Path) -> io::Result<()> {
    let page = render_html(history).map_err(io::Error::other)?;
    fs::write(path, page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::Sample;
    use crate::size::{ByteSize, Unit};
    use chrono::{Local, TimeZone};
    use tempfile::tempdir;

    fn history() -> History {
        let mut history = History::new(Unit::Auto, &[101, 202]);
        for (pid, mib) in [(101, 1), (202, 4), (101, 2)] {
            history.record(&Sample {
                when: Local.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
                pid,
                peak_size: ByteSize::ZERO,
                current_size: ByteSize::ZERO,
                peak_resident: ByteSize::ZERO,
                current_resident: ByteSize::from_bytes(mib << 20),
            });
        }
        history
    }

    #[test]
    fn test_render_html_embeds_series() {
        let page = render_html(&history()).unwrap();

        assert!(page.contains(PLOTLY_URL));
        assert!(page.contains("RSS (MiB)"));
        assert!(page.contains(r#""name":"101""#));
        assert!(page.contains(r#""y":[1.0,2.0]"#));
        assert!(page.contains(r#""y":[4.0]"#));
        assert!(page.contains("2024-05-06 07:08:09"));
        assert!(page.contains("Plotly.newPlot"));
        assert!(page.contains(r#"yaxis: { title: "RSS (MiB)", range: [0, 5] }"#));
    }

    #[test]
    fn test_render_html_empty_history() {
        let page = render_html(&History::new(Unit::KiB, &[])).unwrap();
        assert!(page.contains("let data = [];"));
        assert!(page.contains("RSS (KiB)"));
        assert!(page.contains(r#"rangemode: "tozero""#));
    }

    #[test]
    fn test_write_html() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("chart.html");

        write_html(&history(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
    }
}
