//! Script host against the embedded interpreter.

use timetable_core::config::ScriptConfig;
use timetable_service::normalize::parse_third_party_result;
use timetable_service::script::{
    BoaFactory, DEFAULT_SCRAPER, ExecuteOptions, ScriptExecutionError, ScriptHost,
};

fn run(script: &str, input: &str) -> Result<String, ScriptExecutionError> {
    ScriptHost::default().execute(script, input)
}

#[test_log::test]
fn parser_string_is_returned_unchanged() {
    let script = "function scheduleHtmlParser(html) { return 'got:' + html; }";
    assert_eq!(run(script, "<p>").unwrap(), "got:<p>");
}

#[test_log::test]
fn non_string_results_are_stringified() {
    assert_eq!(run("function parse() { return null; }", "").unwrap(), "");
    assert_eq!(run("function parse() { return undefined; }", "").unwrap(), "");
    assert_eq!(run("function parse() { return 42; }", "").unwrap(), "42");
    assert_eq!(
        run("function parse() { return [{ day: 1 }]; }", "").unwrap(),
        r#"[{"day":1}]"#
    );
}

#[test_log::test]
fn promise_settles_through_microtask_drain() {
    let script = "
        function scheduleHtmlParser(html) {
            return new Promise(function (resolve) {
                setTimeout(function () { resolve([{ name: html }]); }, 500);
            });
        }";
    assert_eq!(run(script, "A").unwrap(), r#"[{"name":"A"}]"#);

    let script = "async function scheduleHtmlParser() { await null; await null; return { ok: true }; }";
    assert_eq!(run(script, "").unwrap(), r#"{"ok":true}"#);
}

#[test_log::test]
fn never_settling_promise_returns_empty() {
    let script = "function scheduleHtmlParser() { return new Promise(function () {}); }";
    assert_eq!(run(script, "").unwrap(), "");
}

#[test_log::test]
fn thrown_and_rejected_errors_carry_the_message() {
    let err = run("function parse() { throw new Error('boom'); }", "").unwrap_err();
    assert!(matches!(&err, ScriptExecutionError::Script(m) if m.contains("boom")), "{err}");

    let script = "function scheduleHtmlParser() { return Promise.reject(new Error('nope')); }";
    let err = run(script, "").unwrap_err();
    assert!(matches!(&err, ScriptExecutionError::Script(m) if m.contains("nope")), "{err}");
}

#[test_log::test]
fn lexically_declared_entry_points_are_found() {
    assert_eq!(
        run("const scheduleHtmlParser = (h) => 'ok:' + h;", "x").unwrap(),
        "ok:x"
    );
    assert_eq!(
        run("let parse = function (h) { return h.length; };", "abc").unwrap(),
        "3"
    );
    assert_eq!(
        run("const scheduleHtmlParser = async (h) => 'async:' + h;", "y").unwrap(),
        "async:y"
    );
    assert!(matches!(
        run("const scheduleHtmlParser = 'not callable';", "x"),
        Err(ScriptExecutionError::NoEntryPoint)
    ));
}

#[test_log::test]
fn missing_entry_point() {
    let err = run("var scheduleHtmlParser = 3; function helper() {}", "").unwrap_err();
    assert_eq!(err, ScriptExecutionError::NoEntryPoint);
}

#[test_log::test]
fn browser_globals_exist() {
    let script = "
        console.log('loading', { v: 1 });
        console.warn('careful');
        function scheduleHtmlParser() {
            var found = document.getElementById('x');
            return [typeof window, typeof navigator.userAgent, found === null].join(',');
        }";
    assert_eq!(run(script, "").unwrap(), "object,string,true");
}

#[test_log::test]
fn runaway_loop_is_stopped() {
    let config = ScriptConfig {
        loop_iteration_limit: 1_000,
        ..ScriptConfig::default()
    };
    let host = ScriptHost::new(BoaFactory, config);
    let err = host
        .execute("function parse() { while (true) {} }", "")
        .unwrap_err();
    assert!(matches!(err, ScriptExecutionError::Script(_)));

    let err = host.execute("while (true) {}", "").unwrap_err();
    assert!(matches!(err, ScriptExecutionError::Script(_)));
}

#[test_log::test]
fn provider_parser_timer_compose() {
    let script = "
        function scheduleHtmlProvider(html, token, extra) {
            return Promise.resolve(html + '|' + token);
        }
        function scheduleHtmlParser(provided) {
            var parts = provided.split('|');
            return { courses: [{ name: parts[0], teacher: parts[1], day: 1, weeks: [1], sections: [1] }] };
        }
        function scheduleTimer(ctx) {
            return { totalWeek: 20, sectionsFrom: ctx.parserRes.courses.length };
        }";
    let options = ExecuteOptions {
        auth_token: "Li".to_string(),
        extra: String::new(),
    };
    let out = ScriptHost::default()
        .execute_with(script, "Optics", &options)
        .unwrap();

    let result = parse_third_party_result(&out);
    assert_eq!(result.courses[0].name, "Optics");
    assert_eq!(result.courses[0].teacher, "Li");
    assert_eq!(
        result.auxiliary,
        Some(serde_json::json!({"totalWeek": 20, "sectionsFrom": 1}))
    );
}

#[test_log::test]
fn provider_stop_sentinel() {
    let script = "
        function scheduleHtmlProvider() { return 'do not continue'; }
        function scheduleHtmlParser() { throw new Error('must not run'); }";
    assert_eq!(run(script, "").unwrap(), "do not continue");
}

const TIMETABLE_PAGE: &str = r#"
<html><body>
<table class="kb">
<tr><th>节次</th><th>星期一</th><th>星期二</th><th>星期三</th></tr>
<tr>
  <td>第1节</td>
  <td rowspan="2">高等数学<br>张三<br>1-16周<br>教一楼101</td>
  <td></td>
  <td rowspan="2">大学英语<br>李四<br>1-15周(单)<br>外语楼202<hr>大学英语<br>李四<br>2-16周(双)<br>外语楼203</td>
</tr>
<tr><td>第2节</td><td>&nbsp;</td></tr>
<tr>
  <td>第3节</td>
  <td></td>
  <td>线性代数<br>王五<br>[3-4节]<br>1-8周<br>理科楼305</td>
  <td></td>
</tr>
</table>
</body></html>
"#;

#[test_log::test]
fn default_scraper_reads_grid_page() {
    let out = run(DEFAULT_SCRAPER, TIMETABLE_PAGE).unwrap();
    let result = parse_third_party_result(&out);
    assert_eq!(result.courses.len(), 4, "{out}");

    let calculus = &result.courses[0];
    assert_eq!(calculus.name, "高等数学");
    assert_eq!(calculus.teacher, "张三");
    assert_eq!(calculus.position, "教一楼101");
    assert_eq!(calculus.day, 1);
    assert_eq!(calculus.weeks.len(), 16);
    assert_eq!(calculus.periods.iter().copied().collect::<Vec<_>>(), vec![1, 2]);

    let odd_english = &result.courses[1];
    assert_eq!(odd_english.day, 3);
    assert!(odd_english.weeks.iter().all(|w| w % 2 == 1));
    assert_eq!(odd_english.position, "外语楼202");
    assert!(result.courses[2].weeks.iter().all(|w| w % 2 == 0));

    let algebra = &result.courses[3];
    assert_eq!(algebra.day, 2);
    assert_eq!(algebra.periods.iter().copied().collect::<Vec<_>>(), vec![3, 4]);
    assert_eq!(algebra.weeks.iter().copied().max(), Some(8));
}

#[test_log::test]
fn default_scraper_ignores_unrelated_pages() {
    assert_eq!(run(DEFAULT_SCRAPER, "<p>hello</p>").unwrap(), "[]");
    assert_eq!(run(DEFAULT_SCRAPER, "").unwrap(), "[]");
}

#[test_log::test]
fn default_scraper_handles_long_digit_runs() {
    let id = "1".repeat(48);
    let page = format!(
        "<table><tr><th>节次</th><th>星期一</th><th>星期二</th></tr>\
         <tr><td>第1节</td><td>数据结构<br>赵六<br>ID {id}x<br>1-16周<br>教二楼201</td><td></td></tr></table>"
    );
    let started = std::time::Instant::now();
    let out = run(DEFAULT_SCRAPER, &page).unwrap();
    assert!(started.elapsed() < std::time::Duration::from_secs(10));

    let result = parse_third_party_result(&out);
    assert_eq!(result.courses.len(), 1, "{out}");
    assert_eq!(result.courses[0].name, "数据结构");
    assert_eq!(result.courses[0].weeks.len(), 16);
}
