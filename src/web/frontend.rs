//! Embedded HTML/CSS/JS frontend for the marketscope dashboard.
//!
//! The page is compiled into the binary as a string constant. No external
//! assets, no build tools, no CDN dependencies.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>marketscope</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; line-height: 1.5; }
.app { max-width: 1100px; margin: 0 auto; padding: 24px; }
header { display: flex; align-items: center; justify-content: space-between; margin-bottom: 24px;
  padding-bottom: 16px; border-bottom: 1px solid var(--border); }
header h1 { font-size: 22px; font-weight: 600; }
input, textarea, select, button { font: inherit; color: var(--text); background: var(--surface);
  border: 1px solid var(--border); border-radius: var(--radius); padding: 6px 10px; }
button { cursor: pointer; background: var(--accent); color: #0d1117; border: none; font-weight: 600; }
section { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius);
  padding: 16px; margin-bottom: 16px; }
section h2 { font-size: 16px; margin-bottom: 12px; }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid var(--border); }
th { color: var(--muted); font-weight: 500; }
textarea { width: 100%; min-height: 140px; margin-bottom: 8px; }
.muted { color: var(--muted); }
.high { color: var(--red); } .medium { color: var(--yellow); } .low { color: var(--green); }
.card { border: 1px solid var(--border); border-radius: var(--radius); padding: 10px; margin-top: 8px; }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1>marketscope</h1>
    <div>
      <input id="user" placeholder="User ID">
      <button onclick="refresh()">Load</button>
    </div>
  </header>

  <section>
    <h2>Alerts</h2>
    <div id="alerts" class="muted">Enter a user ID to load alerts.</div>
  </section>

  <section>
    <h2>Competitors</h2>
    <div id="competitors" class="muted">No data available</div>
  </section>

  <section>
    <h2>AI Recommendations</h2>
    <textarea id="ai-text" placeholder="Paste an AI response"></textarea>
    <select id="strategy">
      <option value="json-then-text">json-then-text</option>
      <option value="json-only">json-only</option>
      <option value="text-only">text-only</option>
    </select>
    <button onclick="extract()">Extract</button>
    <div id="recommendations"></div>
  </section>
</div>
<script>
function esc(s) {
  return String(s ?? '').replace(/[&<>"']/g, c =>
    ({'&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'}[c]));
}

async function api(path, opts = {}) {
  const user = document.getElementById('user').value.trim();
  opts.headers = Object.assign({'Content-Type': 'application/json'}, opts.headers || {});
  if (user) opts.headers['X-User-ID'] = user;
  const res = await fetch(path, opts);
  const body = await res.json().catch(() => ({}));
  if (!res.ok) throw new Error(body.error || ('HTTP ' + res.status));
  return body;
}

async function loadAlerts() {
  const el = document.getElementById('alerts');
  try {
    const data = await api('/api/v1/monitoring/alerts');
    const alerts = Array.isArray(data) ? data : (data.alerts || []);
    el.className = '';
    el.innerHTML = alerts.length === 0 ? '<span class="muted">No alerts</span>' :
      '<table><tr><th>Severity</th><th>Competitor</th><th>Message</th></tr>' +
      alerts.map(a => `<tr><td class="${esc((a.severity || a.priority || '').toLowerCase())}">` +
        `${esc(a.severity || a.priority)}</td><td>${esc(a.competitor_name)}</td>` +
        `<td>${esc(a.title || a.message)}</td></tr>`).join('') + '</table>';
  } catch (e) {
    el.className = 'muted';
    el.textContent = e.message;
  }
}

async function loadCompetitors() {
  const el = document.getElementById('competitors');
  try {
    const data = await api('/api/v1/competitors/summary');
    el.className = '';
    el.innerHTML = data.competitors.length === 0 ? '<span class="muted">No data available</span>' :
      '<table><tr><th>Competitor</th><th>Posts</th><th>Sentiment</th><th>Avg engagement</th></tr>' +
      data.competitors.map(c => `<tr><td>${esc(c.competitor)}</td><td>${c.post_count}</td>` +
        `<td>${esc(c.sentiment_label || 'n/a')}</td><td>${c.avg_engagement.toFixed(1)}</td></tr>`).join('') +
      '</table>';
  } catch (e) {
    el.className = 'muted';
    el.textContent = e.message;
  }
}

async function extract() {
  const el = document.getElementById('recommendations');
  try {
    const data = await api('/api/recommendations/extract', {
      method: 'POST',
      body: JSON.stringify({
        text: document.getElementById('ai-text').value,
        strategy: document.getElementById('strategy').value,
      }),
    });
    el.innerHTML = data.count === 0 ? '<p class="muted">No recommendations found</p>' :
      data.recommendations.map(r => `<div class="card"><strong>${esc(r.title)}</strong> ` +
        `<span class="${esc(r.priority)}">${esc(r.priority)}</span> ` +
        `<span class="muted">${esc(r.actionType)} / ${esc(r.estimatedTime)}</span>` +
        (r.campaign ? `<div class="muted">${esc(r.campaign)}</div>` : '') +
        `<p>${esc(r.description)}</p></div>`).join('');
  } catch (e) {
    el.textContent = e.message;
  }
}

function refresh() {
  loadAlerts();
  loadCompetitors();
}
</script>
</body>
</html>
"##;
