//! Inline stylesheet and script shared by every HTML report.

pub const CSS: &str = r#"
* {
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    line-height: 1.5;
    color: #111827;
    background: #f9fafb;
}

.container {
    max-width: 1280px;
    margin: 0 auto;
    padding: 2rem;
}

header {
    margin-bottom: 1.5rem;
    padding-bottom: 1rem;
    border-bottom: 3px solid #1e40af;
}

header h1 {
    font-size: 1.75rem;
    color: #1e40af;
}

header .meta {
    color: #6b7280;
    font-size: 0.9rem;
}

.kpis {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
    gap: 1rem;
    margin-bottom: 1.5rem;
}

.kpi {
    background: #ffffff;
    padding: 1rem;
    border-radius: 0.5rem;
    border-left: 4px solid #1e40af;
    box-shadow: 0 1px 2px rgba(0, 0, 0, 0.06);
}

.kpi h3 {
    font-size: 0.8rem;
    font-weight: 600;
    color: #6b7280;
    text-transform: uppercase;
}

.kpi .value {
    font-size: 1.6rem;
    font-weight: 700;
}

.section {
    background: #ffffff;
    border-radius: 0.5rem;
    margin-bottom: 1.25rem;
    box-shadow: 0 1px 2px rgba(0, 0, 0, 0.06);
}

.section > h2 {
    cursor: pointer;
    user-select: none;
    font-size: 1.1rem;
    padding: 0.75rem 1rem;
    border-bottom: 1px solid #e5e7eb;
}

.section > h2::before {
    content: '\25BE  ';
}

.section.collapsed > h2::before {
    content: '\25B8  ';
}

.section .body {
    padding: 1rem;
}

.section.collapsed .body {
    display: none;
}

table {
    width: 100%;
    border-collapse: collapse;
    font-size: 0.875rem;
}

th, td {
    padding: 0.4rem 0.6rem;
    border-bottom: 1px solid #e5e7eb;
    text-align: left;
}

th {
    background: #1e40af;
    color: #ffffff;
}

td.num, th.num {
    text-align: right;
}

th.sortable {
    cursor: pointer;
}

th.sortable.asc::after {
    content: ' \25B2';
}

th.sortable.desc::after {
    content: ' \25BC';
}

tbody tr:nth-child(even) {
    background: #f3f4f6;
}

.tier {
    color: #ffffff;
    font-weight: 600;
    border-radius: 0.25rem;
}

.badge {
    display: inline-block;
    padding: 0.1rem 0.5rem;
}

.column-toggles {
    display: flex;
    flex-wrap: wrap;
    gap: 0.75rem;
    margin-bottom: 0.75rem;
    font-size: 0.8rem;
}

.chart {
    display: flex;
    align-items: flex-end;
    gap: 0.5rem;
    height: 200px;
    padding-top: 1rem;
}

.chart .bar-wrap {
    flex: 1;
    display: flex;
    flex-direction: column;
    justify-content: flex-end;
    align-items: center;
    height: 100%;
}

.chart .bar {
    width: 100%;
    border-radius: 0.25rem 0.25rem 0 0;
}

.chart .label {
    font-size: 0.7rem;
    color: #6b7280;
}

.cards {
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(160px, 1fr));
    gap: 0.75rem;
    margin-bottom: 1rem;
}

.card {
    border: 1px solid #e5e7eb;
    border-radius: 0.5rem;
    padding: 0.75rem;
}

.card.empty {
    color: #9ca3af;
    font-style: italic;
}

.card .count {
    font-size: 1.3rem;
    font-weight: 700;
}

.nav {
    display: flex;
    flex-wrap: wrap;
    gap: 0.5rem;
}

.nav a {
    text-decoration: none;
    color: #111827;
    border: 1px solid #e5e7eb;
    border-radius: 0.375rem;
    padding: 0.35rem 0.6rem;
    font-size: 0.85rem;
}

footer {
    color: #9ca3af;
    font-size: 0.8rem;
    margin-top: 2rem;
    text-align: center;
}

@media print {
    .column-toggles {
        display: none;
    }

    .section.collapsed .body {
        display: block;
    }
}
"#;

pub const JS: &str = r#"
(function() {
    function cellValue(row, column) {
        const cell = row.querySelector(`[data-column="${column}"]`);
        if (!cell) {
            return '';
        }
        return cell.dataset.sort !== undefined ? cell.dataset.sort : cell.textContent.trim();
    }

    function sortTable(th) {
        const table = th.closest('table');
        const body = table.tBodies[0];
        const rows = Array.from(body.rows);
        const column = th.dataset.column;
        const direction = th.dataset.direction === 'asc' ? 'desc' : 'asc';

        table.querySelectorAll('th.sortable').forEach(h => {
            h.classList.remove('asc', 'desc');
            delete h.dataset.direction;
        });
        th.dataset.direction = direction;
        th.classList.add(direction);

        rows.sort((a, b) => {
            const aVal = cellValue(a, column);
            const bVal = cellValue(b, column);
            const aNum = parseFloat(aVal);
            const bNum = parseFloat(bVal);
            let cmp;
            if (!isNaN(aNum) && !isNaN(bNum)) {
                cmp = aNum - bNum;
            } else {
                cmp = aVal.localeCompare(bVal);
            }
            return direction === 'asc' ? cmp : -cmp;
        });

        rows.forEach(row => body.appendChild(row));
    }

    function toggleColumn(input) {
        const table = document.getElementById(input.dataset.table);
        if (!table) {
            return;
        }
        table.querySelectorAll(`[data-column="${input.dataset.column}"]`).forEach(cell => {
            cell.style.display = input.checked ? '' : 'none';
        });
    }

    document.addEventListener('DOMContentLoaded', function() {
        document.querySelectorAll('.section > h2').forEach(h => {
            h.addEventListener('click', () => h.parentElement.classList.toggle('collapsed'));
        });
        document.querySelectorAll('th.sortable').forEach(th => {
            th.addEventListener('click', () => sortTable(th));
        });
        document.querySelectorAll('.column-toggles input').forEach(input => {
            input.addEventListener('change', () => toggleColumn(input));
        });
    });
})();
"#;
