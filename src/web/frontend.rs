//! Embedded HTML/CSS/JS frontend for the attest dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies — the charts are
//! hand-rolled SVG. The shared rule tables (score bands, colors) and the
//! demo dataset are injected at render time so the frontend never carries
//! its own copy of a business rule.

use crate::rules::{self, Band, Verdict};
use crate::store::{self, demo};
use crate::web::api::ControlRow;

/// Render the dashboard page with the bootstrap payload baked in.
pub fn render() -> String {
    let config = crate::config::load();
    let demo_controls = demo::demo_controls();

    let bootstrap = serde_json::json!({
        "scoreBands": {
            "high": rules::SCORE_HIGH_MIN,
            "medium": rules::SCORE_MEDIUM_MIN,
        },
        "bandColors": {
            "high": Band::High.color(),
            "medium": Band::Medium.color(),
            "low": Band::Low.color(),
        },
        "verdictColors": {
            "Pass": Verdict::Pass.color(),
            "Partial": Verdict::Partial.color(),
            "Fail": Verdict::Fail.color(),
            "Unknown": Verdict::Unknown.color(),
        },
        "verdictIcons": {
            "Pass": Verdict::Pass.icon(),
            "Partial": Verdict::Partial.icon(),
            "Fail": Verdict::Fail.icon(),
            "Unknown": Verdict::Unknown.icon(),
        },
        "fallbackDelayMs": config.chat.fallback_delay_ms,
        "demo": {
            "controls": demo_controls.iter().map(ControlRow::from_stored).collect::<Vec<_>>(),
            "average_score": store::average_score(&demo_controls),
            "emissions": demo::demo_emissions(),
            "demo": true,
        },
    });

    INDEX_HTML.replace("__ATTEST_BOOTSTRAP__", &bootstrap.to_string())
}

/// The complete single-page dashboard HTML.
const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>attest Dashboard</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

[data-theme="light"] {
  --bg: #f6f8fa;
  --surface: #ffffff;
  --border: #d0d7de;
  --text: #1f2328;
  --text-muted: #656d76;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app { max-width: 1100px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}

header h1 { font-size: 22px; font-weight: 600; }
header h1 .logo { color: var(--accent); font-weight: 700; }
header .subtitle { color: var(--text-muted); font-size: 13px; }
.header-actions { display: flex; gap: 8px; align-items: center; }

.badge {
  display: inline-flex; align-items: center; gap: 4px;
  padding: 4px 10px; border-radius: 12px; font-size: 12px; font-weight: 500;
  background: var(--surface); border: 1px solid var(--border);
}
.badge.ok { border-color: var(--green); color: var(--green); }
.badge.err { border-color: var(--red); color: var(--red); }
.badge.demo { border-color: var(--yellow); color: var(--yellow); }

.btn {
  padding: 8px 14px; border: 1px solid var(--border); border-radius: 6px;
  background: var(--surface); color: var(--text); font-size: 13px;
  cursor: pointer; transition: all 0.15s;
}
.btn:hover { border-color: var(--accent); color: var(--accent); }
.btn.primary { background: var(--accent); border-color: var(--accent); color: #fff; }

/* Cards */
.card {
  background: var(--surface); border: 1px solid var(--border);
  border-radius: var(--radius); padding: 20px; margin-bottom: 16px;
}
.card h2 { font-size: 15px; font-weight: 600; margin-bottom: 16px; }

.stats-grid {
  display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
  gap: 16px; margin-bottom: 16px;
}
.stat-card {
  background: var(--surface); border: 1px solid var(--border);
  border-radius: var(--radius); padding: 16px; text-align: center;
}
.stat-card .value { font-size: 26px; font-weight: 700; }
.stat-card .label { font-size: 12px; color: var(--text-muted); margin-top: 4px; }

.charts { display: grid; grid-template-columns: 1fr 1.4fr; gap: 16px; }
.chart-box { min-height: 240px; }
.chart-legend { display: flex; gap: 16px; justify-content: center; margin-top: 10px; font-size: 12px; color: var(--text-muted); }
.chart-legend .dot { display: inline-block; width: 9px; height: 9px; border-radius: 50%; margin-right: 4px; }
svg text { fill: var(--text-muted); font-size: 11px; }
svg .grid-line { stroke: var(--border); }

/* Results table */
table { width: 100%; border-collapse: collapse; font-size: 13px; }
th { text-align: left; color: var(--text-muted); font-weight: 500; font-size: 12px; }
th, td { padding: 10px 12px; border-bottom: 1px solid var(--border); vertical-align: top; }
.verdict-pill {
  display: inline-block; padding: 2px 10px; border-radius: 12px;
  font-size: 12px; font-weight: 600;
}
.score-bar { display: inline-block; width: 60px; height: 6px; border-radius: 3px; background: var(--border); vertical-align: middle; margin-right: 8px; }
.score-bar > div { height: 100%; border-radius: 3px; }

/* Floating panel */
#panel {
  position: fixed; width: 380px; max-height: 560px;
  background: var(--surface); border: 1px solid var(--border);
  border-radius: 14px; box-shadow: 0 20px 60px rgba(0,0,0,0.45);
  display: none; flex-direction: column; overflow: hidden; z-index: 1000;
}
#panel.open { display: flex; }
.panel-drag {
  background: linear-gradient(90deg, #3b82f6 0%, #8b5cf6 100%);
  color: #fff; padding: 12px 16px; cursor: move;
  display: flex; justify-content: space-between; align-items: center;
  user-select: none;
}
.panel-drag b { font-size: 14px; }
.panel-drag .close {
  background: rgba(255,255,255,0.15); border: none; color: #fff;
  border-radius: 6px; width: 24px; height: 24px; cursor: pointer;
}
.panel-tabs { display: flex; gap: 8px; padding: 10px 14px; background: rgba(0,0,0,0.15); }
.panel-tabs button {
  flex: 1; padding: 7px; border: none; border-radius: 8px;
  background: transparent; color: var(--text); font-size: 13px; cursor: pointer;
}
.panel-tabs button.active { background: var(--accent); color: #fff; }
.panel-body { padding: 14px; overflow-y: auto; }
.panel-body label { font-size: 12px; color: var(--text-muted); display: block; margin: 8px 0 2px; }
.panel-body input, .panel-body textarea {
  width: 100%; padding: 8px; border: 1px solid var(--border); border-radius: 6px;
  background: var(--bg); color: var(--text); font-size: 13px; font-family: var(--font);
}
.panel-body textarea { min-height: 64px; resize: vertical; }

.result-card {
  margin-top: 12px; padding: 14px; border-radius: 10px;
  background: rgba(88,166,255,0.06); border: 1px solid var(--border); font-size: 13px;
}
.result-card .score { font-size: 22px; font-weight: 700; }
.result-card .explanation { margin-top: 8px; color: var(--text-muted); }
.result-card.error { background: rgba(248,81,73,0.08); border-color: var(--red); color: var(--red); }

/* Chat */
#chat-log { display: flex; flex-direction: column; gap: 8px; max-height: 280px; overflow-y: auto; margin-bottom: 10px; }
.msg { padding: 9px 12px; border-radius: 10px; font-size: 13px; max-width: 85%; white-space: pre-wrap; }
.msg.user { align-self: flex-end; background: rgba(59,130,246,0.25); }
.msg.assistant { align-self: flex-start; background: rgba(139,92,246,0.15); }
.msg.typing { color: var(--text-muted); font-style: italic; }
.chat-row { display: flex; gap: 8px; }
.chat-row input { flex: 1; }

.empty { text-align: center; padding: 32px; color: var(--text-muted); }
</style>
</head>
<body>
<div class="app">

  <header>
    <div>
      <h1><span class="logo">attest</span> Compliance Dashboard</h1>
      <div class="subtitle" id="sustainability">Sustainable AI compliance validation</div>
    </div>
    <div class="header-actions">
      <span class="badge" id="backend-badge">backend: checking…</span>
      <span class="badge demo" id="demo-badge" style="display:none">demo data</span>
      <button class="btn" id="btn-theme">Theme</button>
      <button class="btn" id="btn-report">Download Report</button>
      <button class="btn primary" id="btn-panel">Assistant</button>
    </div>
  </header>

  <div class="stats-grid">
    <div class="stat-card"><div class="value" id="stat-avg">—</div><div class="label">Average Score</div></div>
    <div class="stat-card"><div class="value" id="stat-count">—</div><div class="label">Controls Validated</div></div>
    <div class="stat-card"><div class="value" id="stat-co2">—</div><div class="label">Total CO₂</div></div>
    <div class="stat-card"><div class="value" id="stat-energy">—</div><div class="label">Energy Saved</div></div>
  </div>

  <div class="charts">
    <div class="card">
      <h2>Verdict Distribution</h2>
      <div class="chart-box" id="donut-chart"></div>
      <div class="chart-legend" id="donut-legend"></div>
    </div>
    <div class="card">
      <h2>Emissions Over Time</h2>
      <div class="chart-box" id="line-chart"></div>
    </div>
  </div>

  <div class="card">
    <h2>Validation Results</h2>
    <table>
      <thead>
        <tr><th>Control</th><th>Verdict</th><th>Score</th><th>Explanation</th><th>Recommendation</th></tr>
      </thead>
      <tbody id="results-tbody"></tbody>
    </table>
    <div class="empty" id="results-empty" style="display:none">No validation results yet.</div>
  </div>

</div>

<!-- Floating assistant panel -->
<div id="panel">
  <div class="panel-drag" id="panel-drag">
    <b>Compliance Assistant</b>
    <button class="close" id="panel-close">×</button>
  </div>
  <div class="panel-tabs">
    <button id="tab-validate" class="active">Validate</button>
    <button id="tab-chat">Chat</button>
  </div>
  <div class="panel-body" id="pane-validate">
    <label>Checklist ID</label>
    <input id="v-id" placeholder="CTRL-001">
    <label>Control text</label>
    <input id="v-control" placeholder="Data encryption policy">
    <label>Evidence</label>
    <textarea id="v-evidence" placeholder="Paste evidence text…"></textarea>
    <button class="btn primary" id="v-submit" style="margin-top:10px;width:100%">Validate</button>
    <div id="v-result"></div>
  </div>
  <div class="panel-body" id="pane-chat" style="display:none">
    <div id="chat-log"></div>
    <div class="chat-row">
      <input id="c-input" placeholder="Ask about compliance…">
      <button class="btn primary" id="c-send">Send</button>
    </div>
  </div>
</div>

<script>
// Shared rule tables and demo dataset, injected by the server.
const BOOT = __ATTEST_BOOTSTRAP__;

// ---------------------------------------------------------------------------
// Component state (explicit objects, no free-floating globals)
// ---------------------------------------------------------------------------
const dashState = { controls: [], averageScore: 0, emissions: {}, demo: false };
const chartState = { donut: null, line: null };
const panelState = { injected: false, open: false, tab: 'validate', x: 0, y: 0, lastResult: null };
const dragState = { dragging: false, offsetX: 0, offsetY: 0 };

function bandFor(score) {
  if (score >= BOOT.scoreBands.high) return 'high';
  if (score >= BOOT.scoreBands.medium) return 'medium';
  return 'low';
}
const bandColor = (score) => BOOT.bandColors[bandFor(score)];
const esc = (s) => String(s ?? '').replace(/&/g, '&amp;').replace(/</g, '&lt;')
  .replace(/>/g, '&gt;').replace(/"/g, '&quot;');

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------
function initTheme() {
  const dark = localStorage.getItem('attest-dark');
  const preferDark = dark === null
    ? window.matchMedia('(prefers-color-scheme: dark)').matches
    : dark === 'true';
  document.documentElement.dataset.theme = preferDark ? 'dark' : 'light';
}

function toggleTheme() {
  const isDark = document.documentElement.dataset.theme !== 'light';
  document.documentElement.dataset.theme = isDark ? 'light' : 'dark';
  localStorage.setItem('attest-dark', String(!isDark));
  // Chart colors flow from CSS variables, so existing chart nodes restyle
  // in place; nothing is rebuilt here.
}

// ---------------------------------------------------------------------------
// Data loading (demo fallback is all-or-nothing)
// ---------------------------------------------------------------------------
async function loadDashboard() {
  try {
    const [resultsRes, emissionsRes] = await Promise.all([
      fetch('/api/results'),
      fetch('/api/emissions'),
    ]);
    if (!resultsRes.ok || !emissionsRes.ok) throw new Error('backend not available');
    const results = await resultsRes.json();
    const emissions = await emissionsRes.json();
    dashState.controls = results.controls || [];
    dashState.averageScore = results.average_score || 0;
    dashState.emissions = emissions;
    dashState.demo = !!results.demo;
  } catch (e) {
    // Either fetch failing switches the whole dashboard to the demo set.
    dashState.controls = BOOT.demo.controls;
    dashState.averageScore = BOOT.demo.average_score;
    dashState.emissions = BOOT.demo.emissions;
    dashState.demo = true;
  }
  renderDashboard();
}

function renderDashboard() {
  renderSummary();
  renderTable();
  renderCharts();
  document.getElementById('demo-badge').style.display = dashState.demo ? '' : 'none';
}

function renderSummary() {
  const co2 = dashState.emissions.total_emissions || 0;
  const co2Text = co2 < 1 ? (co2 * 1000).toFixed(1) + 'g' : co2.toFixed(2) + 'kg';
  document.getElementById('stat-avg').textContent = Math.round(dashState.averageScore) + '%';
  document.getElementById('stat-count').textContent = dashState.controls.length;
  document.getElementById('stat-co2').textContent = co2Text;
  document.getElementById('stat-energy').textContent = (dashState.emissions.energy_saved || 0) + '%';
  document.getElementById('sustainability').textContent =
    'Sustainable AI · ' + (dashState.emissions.energy_saved || 0) +
    '% energy efficiency · ' + co2Text + ' CO₂ total';
}

function renderTable() {
  const tbody = document.getElementById('results-tbody');
  const empty = document.getElementById('results-empty');
  tbody.innerHTML = '';
  empty.style.display = dashState.controls.length ? 'none' : '';

  for (const c of dashState.controls) {
    const row = document.createElement('tr');
    const vColor = BOOT.verdictColors[c.verdict] || BOOT.verdictColors.Unknown;
    const vIcon = BOOT.verdictIcons[c.verdict] || BOOT.verdictIcons.Unknown;
    row.innerHTML =
      '<td>' + esc(c.control) + '</td>' +
      '<td><span class="verdict-pill" style="color:' + vColor + ';background:' + vColor + '22">' +
        vIcon + ' ' + esc(c.verdict) + '</span></td>' +
      '<td><span class="score-bar"><div style="width:' + Math.min(100, c.score) +
        '%;background:' + bandColor(c.score) + '"></div></span>' + Math.round(c.score) + '%</td>' +
      '<td>' + esc(c.explanation) + '</td>' +
      '<td style="color:var(--text-muted)">' + esc(c.recommendation) + '</td>';
    tbody.appendChild(row);
  }
}

// ---------------------------------------------------------------------------
// Charts (hand-rolled SVG; destroy before rebuild, one chart per container)
// ---------------------------------------------------------------------------
function destroyChart(handle) {
  if (handle && handle.container) handle.container.innerHTML = '';
}

function renderCharts() {
  destroyChart(chartState.donut);
  chartState.donut = buildDonut();
  destroyChart(chartState.line);
  chartState.line = buildLine();
}

function buildDonut() {
  const container = document.getElementById('donut-chart');
  container.innerHTML = '';

  const counts = { Pass: 0, Partial: 0, Fail: 0 };
  for (const c of dashState.controls) {
    if (counts[c.verdict] !== undefined) counts[c.verdict]++;
  }
  const total = counts.Pass + counts.Partial + counts.Fail;
  const entries = [
    ['Pass', counts.Pass], ['Partial', counts.Partial], ['Fail', counts.Fail],
  ];

  const size = 220, cx = size / 2, cy = size / 2, r = 80, width = 26;
  let svg = '<svg viewBox="0 0 ' + size + ' ' + size + '" width="100%" height="220">';
  if (total === 0) {
    svg += '<circle cx="' + cx + '" cy="' + cy + '" r="' + r +
      '" fill="none" class="grid-line" stroke-width="' + width + '"/>';
  } else {
    let angle = -Math.PI / 2;
    for (const [verdict, count] of entries) {
      if (!count) continue;
      const sweep = (count / total) * Math.PI * 2;
      const x1 = cx + r * Math.cos(angle), y1 = cy + r * Math.sin(angle);
      const x2 = cx + r * Math.cos(angle + sweep), y2 = cy + r * Math.sin(angle + sweep);
      const large = sweep > Math.PI ? 1 : 0;
      // A full circle collapses to a zero-length arc; draw it as a circle.
      if (count === total) {
        svg += '<circle cx="' + cx + '" cy="' + cy + '" r="' + r + '" fill="none" stroke="' +
          BOOT.verdictColors[verdict] + '" stroke-width="' + width + '"/>';
      } else {
        svg += '<path d="M ' + x1 + ' ' + y1 + ' A ' + r + ' ' + r + ' 0 ' + large +
          ' 1 ' + x2 + ' ' + y2 + '" fill="none" stroke="' + BOOT.verdictColors[verdict] +
          '" stroke-width="' + width + '"/>';
      }
      angle += sweep;
    }
  }
  svg += '<text x="' + cx + '" y="' + (cy + 4) + '" text-anchor="middle" style="font-size:18px;font-weight:700">' +
    total + '</text></svg>';
  container.innerHTML = svg;

  const legend = document.getElementById('donut-legend');
  legend.innerHTML = entries.map(([verdict, count]) =>
    '<span><span class="dot" style="background:' + BOOT.verdictColors[verdict] + '"></span>' +
    verdict + ': ' + count + '</span>').join('');

  return { container };
}

function buildLine() {
  const container = document.getElementById('line-chart');
  container.innerHTML = '';

  const history = dashState.emissions.history || [];
  if (!history.length) {
    container.innerHTML = '<div class="empty">No emissions history.</div>';
    return { container };
  }

  const w = 460, h = 220, padX = 44, padY = 24;
  const grams = history.map((e) => e.emissions * 1000);
  const max = Math.max(...grams) * 1.15 || 1;
  const stepX = history.length > 1 ? (w - padX * 2) / (history.length - 1) : 0;
  const x = (i) => padX + i * stepX;
  const y = (g) => h - padY - (g / max) * (h - padY * 2);

  let svg = '<svg viewBox="0 0 ' + w + ' ' + h + '" width="100%" height="220">';
  for (let gl = 0; gl <= 4; gl++) {
    const gy = padY + (gl / 4) * (h - padY * 2);
    const label = (max * (1 - gl / 4)).toFixed(1);
    svg += '<line class="grid-line" x1="' + padX + '" y1="' + gy + '" x2="' + (w - padX) +
      '" y2="' + gy + '" stroke-width="1"/>';
    svg += '<text x="' + (padX - 6) + '" y="' + (gy + 3) + '" text-anchor="end">' + label + 'g</text>';
  }

  const points = grams.map((g, i) => x(i) + ',' + y(g)).join(' ');
  svg += '<polyline points="' + points + '" fill="none" stroke="#00A676" stroke-width="2"/>';
  grams.forEach((g, i) => {
    svg += '<circle cx="' + x(i) + '" cy="' + y(g) + '" r="3.5" fill="#00A676">' +
      '<title>' + esc(history[i].timestamp) + ': ' + g.toFixed(2) + 'g CO₂</title></circle>';
    if (history.length <= 8 || i % Math.ceil(history.length / 8) === 0) {
      svg += '<text x="' + x(i) + '" y="' + (h - 6) + '" text-anchor="middle">' +
        esc(String(history[i].timestamp).slice(0, 10)) + '</text>';
    }
  });
  svg += '</svg>';
  container.innerHTML = svg;
  return { container };
}

// ---------------------------------------------------------------------------
// Floating panel (idempotent open, drag state machine, two tabs)
// ---------------------------------------------------------------------------
function openPanel() {
  const panel = document.getElementById('panel');
  if (!panelState.injected) {
    panelState.x = window.innerWidth - 410;
    panelState.y = Math.max(20, window.innerHeight - 600);
    panel.style.left = panelState.x + 'px';
    panel.style.top = panelState.y + 'px';
    panelState.injected = true;
  }
  // A second open is a no-op beyond making the panel visible.
  panel.classList.add('open');
  panelState.open = true;
}

function closePanel() {
  document.getElementById('panel').classList.remove('open');
  panelState.open = false;
}

function switchTab(tab) {
  panelState.tab = tab;
  document.getElementById('tab-validate').classList.toggle('active', tab === 'validate');
  document.getElementById('tab-chat').classList.toggle('active', tab === 'chat');
  document.getElementById('pane-validate').style.display = tab === 'validate' ? '' : 'none';
  document.getElementById('pane-chat').style.display = tab === 'chat' ? '' : 'none';
}

// Drag: idle -> dragging on pointerdown in the header, back to idle on
// pointerup anywhere; position tracks pointer delta from the press point.
function wireDrag() {
  const panel = document.getElementById('panel');
  const handle = document.getElementById('panel-drag');

  handle.addEventListener('pointerdown', (e) => {
    if (e.target.closest('.close')) return;
    dragState.dragging = true;
    dragState.offsetX = e.clientX - panelState.x;
    dragState.offsetY = e.clientY - panelState.y;
  });
  document.addEventListener('pointermove', (e) => {
    if (!dragState.dragging) return;
    panelState.x = e.clientX - dragState.offsetX;
    panelState.y = e.clientY - dragState.offsetY;
    panel.style.left = panelState.x + 'px';
    panel.style.top = panelState.y + 'px';
  });
  document.addEventListener('pointerup', () => { dragState.dragging = false; });
}

// ---------------------------------------------------------------------------
// Validate tab (keeps only the most recent result)
// ---------------------------------------------------------------------------
async function submitValidation() {
  const btn = document.getElementById('v-submit');
  const out = document.getElementById('v-result');
  const evidence = document.getElementById('v-evidence').value.trim();
  if (!evidence) return;

  btn.disabled = true;
  btn.textContent = 'Validating…';
  try {
    const res = await fetch('/api/validate', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({
        checklist_id: document.getElementById('v-id').value.trim() || null,
        control_text: document.getElementById('v-control').value.trim() || null,
        evidence_text: evidence,
      }),
    });
    const body = await res.json();
    if (!res.ok) throw new Error(body.error || ('HTTP ' + res.status));

    panelState.lastResult = body;
    const score = body.final_score ?? body.score ?? 0;
    out.innerHTML =
      '<div class="result-card">' +
      '<div style="display:flex;justify-content:space-between">' +
      '<div><div style="color:var(--text-muted);font-size:12px">Verdict</div><b>' +
      esc(body.verdict || 'Unknown') + '</b></div>' +
      '<div style="text-align:right"><div style="color:var(--text-muted);font-size:12px">Score</div>' +
      '<span class="score" style="color:' + bandColor(score) + '">' + Math.round(score) + '%</span></div>' +
      '</div>' +
      '<div class="explanation">' + esc(body.explanation || 'No explanation provided') + '</div>' +
      '</div>';
    loadDashboard();
  } catch (e) {
    // The error card carries the failure text (incl. the HTTP status) and
    // leaves panelState.lastResult untouched.
    out.innerHTML = '<div class="result-card error">Error: ' + esc(e.message) + '</div>';
  } finally {
    btn.disabled = false;
    btn.textContent = 'Validate';
  }
}

// ---------------------------------------------------------------------------
// Chat tab (append-only transcript, typing indicator, canned fallback)
// ---------------------------------------------------------------------------
function appendMessage(role, content) {
  const log = document.getElementById('chat-log');
  const div = document.createElement('div');
  div.className = 'msg ' + role;
  div.textContent = content;
  log.appendChild(div);
  log.scrollTop = log.scrollHeight;
  return div;
}

async function sendChat() {
  const input = document.getElementById('c-input');
  const message = input.value.trim();
  if (!message) return;
  input.value = '';

  appendMessage('user', message);
  const typing = appendMessage('assistant typing', 'typing…');

  try {
    const res = await fetch('/api/chat', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ query: message, context: panelState.lastResult }),
    });
    if (!res.ok) throw new Error('HTTP ' + res.status);
    const body = await res.json();
    const show = () => {
      typing.classList.remove('typing');
      typing.textContent = body.reply;
    };
    // The canned reply waits the configured delay, like a real answer would.
    if (body.fallback) setTimeout(show, BOOT.fallbackDelayMs); else show();
  } catch (e) {
    setTimeout(() => {
      typing.classList.remove('typing');
      typing.textContent = 'Error: ' + e.message;
    }, BOOT.fallbackDelayMs);
  }
}

// ---------------------------------------------------------------------------
// Health + wiring
// ---------------------------------------------------------------------------
async function loadHealth() {
  const badge = document.getElementById('backend-badge');
  try {
    const res = await fetch('/api/health');
    const body = await res.json();
    badge.textContent = body.backend_reachable ? 'backend: online' : 'backend: offline';
    badge.className = 'badge ' + (body.backend_reachable ? 'ok' : 'err');
  } catch (e) {
    badge.textContent = 'backend: unknown';
    badge.className = 'badge err';
  }
}

initTheme();
wireDrag();
document.getElementById('btn-theme').addEventListener('click', toggleTheme);
document.getElementById('btn-report').addEventListener('click', () => {
  window.location.href = '/report/download';
});
document.getElementById('btn-panel').addEventListener('click', openPanel);
document.getElementById('panel-close').addEventListener('click', closePanel);
document.getElementById('tab-validate').addEventListener('click', () => switchTab('validate'));
document.getElementById('tab-chat').addEventListener('click', () => switchTab('chat'));
document.getElementById('v-submit').addEventListener('click', submitValidation);
document.getElementById('c-send').addEventListener('click', sendChat);
document.getElementById('c-input').addEventListener('keypress', (e) => {
  if (e.key === 'Enter') sendChat();
});

appendMessage('assistant', 'Hi! I can help explain compliance issues and provide recommendations.');
loadDashboard();
loadHealth();
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_injects_bootstrap_payload() {
        let html = render();
        assert!(!html.contains("__ATTEST_BOOTSTRAP__"));
        assert!(html.contains("\"scoreBands\""));
        assert!(html.contains("Data Encryption Policy"));
    }

    #[test]
    fn template_has_one_container_per_chart() {
        assert_eq!(INDEX_HTML.matches("id=\"donut-chart\"").count(), 1);
        assert_eq!(INDEX_HTML.matches("id=\"line-chart\"").count(), 1);
    }
}
