//! Prompt templates for the three analysis kinds.
//!
//! Section headings here are the same ones the extractors in
//! [`super::extract`] look for (`EXECUTIVE SUMMARY`, `PRIORITY 1`,
//! `TOP 5 CRITICAL RISKS`, ...). Keep the two in step.

use std::fmt::Write;

use super::context::{
    MaintenanceHistory, ProjectContext, ProjectRiskData, DEFAULT_DOCUMENT_NAME,
    DEFAULT_DOCUMENT_TYPE, DEFAULT_LOCATION,
};

const MULTI_PROJECT_SCOPE: &str = "Multi-Project Portfolio";

/// `R1,234,567.89`. Negative amounts keep the sign in front of the `R`.
pub fn format_rand(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R{grouped}.{:02}", cents % 100)
}

pub fn cost_estimation_prompt(ctx: &ProjectContext, description: &str) -> String {
    let project_name = ctx.project_name.as_deref().unwrap_or("Not specified");
    let location = ctx.location.as_deref().unwrap_or(DEFAULT_LOCATION);
    let scope = ctx.description.as_deref().unwrap_or(description);
    let document = ctx.document_name.as_deref().unwrap_or(DEFAULT_DOCUMENT_NAME);
    let document_type = ctx.document_type.as_deref().unwrap_or(DEFAULT_DOCUMENT_TYPE);
    let budget = format_rand(ctx.budget.unwrap_or(0.0));

    format!(
        "You are a senior construction cost estimator with expertise in South African \
construction projects. Provide a comprehensive, professional cost estimation analysis.

**PROJECT DETAILS**
Project Name: {project_name}
Location: {location}
Budget Allocation: {budget}
Description: {scope}
Project Phases: {phases}
Reference Document: {document}
Document Type: {document_type}

**REQUIRED DELIVERABLES**

1. EXECUTIVE SUMMARY
   - Total estimated cost in ZAR
   - Project duration estimate
   - Key cost drivers
   - Overall confidence assessment

2. DETAILED COST BREAKDOWN
   a) Direct Costs:
      • Materials & Supplies (itemized where possible)
      • Labour (skilled, semi-skilled, unskilled)
      • Equipment & Machinery (rental/purchase)
      • Subcontractor Services
   b) Indirect Costs:
      • Site Establishment & Preliminaries
      • Professional Fees (Engineering, Architecture, Project Management)
      • Insurance & Bonds
      • Permits & Regulatory Compliance (NHBRC, municipal approvals)
   c) Risk Provisions:
      • Contingency Reserve (recommended 5-15% based on project complexity)
      • Price Escalation (current South African inflation)
      • Weather & Seasonal Factors

3. TIMELINE ESTIMATION
   - Project duration in months/weeks
   - Critical path activities and milestones
   - Seasonal considerations for the South African climate

4. RISK FACTORS & ASSUMPTIONS
   - Material availability and supply chain risks
   - Labour market conditions
   - Regulatory requirements (SANS standards, OHS Act)
   - Currency fluctuations affecting imported materials
   - Key assumptions made in this estimate

5. COST OPTIMIZATION RECOMMENDATIONS
   - Value engineering opportunities
   - Alternative materials and procurement strategies
   - Phasing strategies to manage cash flow

6. CONFIDENCE LEVEL ASSESSMENT
   Provide your confidence rating (HIGH/MEDIUM/LOW) with justification.

**OUTPUT FORMAT**
- Clear section headings and bullet points
- All monetary values in South African Rand (R)
- Percentages for variances and contingencies

**COMPLIANCE NOTE**
Ensure all recommendations align with SANS 10400 (National Building Regulations), \
CIDB standards, NHBRC requirements and the Occupational Health and Safety Act.",
        phases = ctx.phase_count,
    )
}

pub fn maintenance_prediction_prompt(history: &MaintenanceHistory) -> String {
    let scope = if history.project_name.is_empty() {
        MULTI_PROJECT_SCOPE
    } else {
        history.project_name.as_str()
    };

    let mut issues = String::new();
    for (i, (title, count)) in history.common_issues.iter().enumerate() {
        let _ = writeln!(issues, "{}. {title} ({count} requests)", i + 1);
    }
    if issues.is_empty() {
        issues.push_str("No recurring issues recorded\n");
    }
    let recent = if history.recent_activity.is_empty() {
        "No recent activity".to_string()
    } else {
        history.recent_activity.join("\n")
    };

    format!(
        "You are a predictive maintenance specialist with expertise in South African \
construction and facility management. Analyze the historical data and provide a \
data-driven predictive maintenance strategy.

**HISTORICAL MAINTENANCE DATA**
Project Scope: {scope}
Total Maintenance Requests: {total}
Completion Rate: {completed} completed ({rate:.1}%)
Average Resolution Time: {avg:.1} days
Critical/High Priority Issues: {high}

**RECURRING ISSUE PATTERNS**
Most Common Issues:
{issues}
**RECENT MAINTENANCE ACTIVITY**
{recent}

**REQUIRED ANALYSIS**

1. PREDICTIVE MAINTENANCE FORECAST
   a) 3-MONTH OUTLOOK: predicted issues with probability, affected components, inspection schedule
   b) 6-MONTH OUTLOOK: degradation, seasonal impact, preventive maintenance windows
   c) 12-MONTH OUTLOOK: major overhauls, replacements, budget provisioning

2. RISK SCORING MATRIX
   • Risk Score (0-100): Likelihood × Impact
   • Severity Classification: Critical/High/Medium/Low
   • Urgency Rating: Immediate/Near-term/Scheduled

3. PREVENTIVE ACTION PLAN
   • Inspection protocols and maintenance procedures (aligned with SANS standards)
   • Required resources and optimal scheduling

4. COST-BENEFIT ANALYSIS
   Compare preventive and reactive maintenance costs in ZAR.

5. PRIORITY RANKING
   PRIORITY 1 (Immediate, 0 to 30 days):
   • Critical safety issues and imminent failures
   PRIORITY 2 (Near-term, 1 to 3 months):
   • High-impact preventive measures
   PRIORITY 3 (Scheduled, 3 to 12 months):
   • Lifecycle replacements and upgrades

6. REGIONAL CONSIDERATIONS
   • Climate impact (seasonal rainfall, temperature extremes)
   • Load-shedding effects on electrical systems
   • Water scarcity impact on plumbing/HVAC
   • Availability of spare parts and qualified technicians

**COMPLIANCE FRAMEWORK**
Recommendations must comply with SANS 10400, the OHS Act, SANS 10254 (water supply \
installations), SANS 10142-1 (wiring regulations) and municipal bylaws.

Start with an EXECUTIVE SUMMARY of key findings and finish with Recommendations.",
        total = history.total_requests,
        completed = history.completed_requests,
        rate = history.completion_rate(),
        avg = history.average_resolution_days,
        high = history.high_priority_requests,
    )
}

pub fn risk_analysis_prompt(data: &ProjectRiskData) -> String {
    let schedule_status = if data.is_behind_schedule {
        "BEHIND SCHEDULE"
    } else {
        "ON SCHEDULE"
    };
    let schedule_variance = if data.is_behind_schedule {
        "Negative - Behind Schedule"
    } else {
        "Neutral/Positive"
    };

    format!(
        "You are a certified project risk management professional specializing in South \
African construction projects. Conduct a comprehensive risk analysis using \
industry-standard methodologies.

**PROJECT OVERVIEW**
Project Name: {name}
Current Status: {status}
Schedule Status: {schedule_status}

**FINANCIAL METRICS**
Approved Budget: {budget}
Actual Cost to Date: {actual}
Budget Utilization: {utilization:.1}%
Budget Variance: {variance} ({variance_pct:.1}%)

**SCHEDULE METRICS**
Project Start Date: {start}
Planned Completion: {end}
Days Remaining: {days} days
Progress Completion: {progress:.1}%

**PERFORMANCE INDICATORS**
Total Tasks: {tasks} ({completed_tasks} completed)
Overdue Tasks: {overdue}
Pending Maintenance Issues: {maintenance}
Schedule Variance: {schedule_variance}

**REQUIRED RISK ASSESSMENT**

1. EXECUTIVE RISK SUMMARY
   • Overall Project Risk Score (0-100), written as \"Risk Score: N\"
   • Risk Classification: Low (0-33) / Medium (34-66) / High (67-100)
   • Immediate concerns requiring executive attention

2. TOP 5 CRITICAL RISKS
   List each as \"a) <description> - Risk Score: N\" covering:
   a) Cost Overrun Risk
   b) Schedule Delay Risk
   c) Quality Compliance Risk
   d) Safety & OHS Risk
   e) Regulatory/Legal Risk

3. DETAILED RISK ANALYSIS
   Give each category a score out of 100:
   Schedule Risk: critical path, SPI, weather delays, recovery strategies
   Financial Risk: CPI, burn rate, escalation, contingency adequacy
   Quality Risk: SANS 10400 compliance, NHBRC warranty, rework probability
   Safety Risk: OHS Act compliance, high-risk activities, PPE adequacy

4. MITIGATION STRATEGY
   Preventive actions, contingency plans and owners for each critical risk.

5. Recommendations
   Prioritise with the MoSCoW method (Must, Should, Could, Won't do now).

6. REGIONAL COMPLIANCE CONSIDERATIONS
   CIDB requirements, NHBRC standards, municipal building control, B-BBEE procurement.

State your Confidence Level (HIGH/MEDIUM/LOW) and quantify risk exposure in ZAR.",
        name = data.project_name,
        status = data.status,
        budget = format_rand(data.budget),
        actual = format_rand(data.actual_cost),
        utilization = data.budget_utilization(),
        variance = format_rand(data.budget_variance),
        variance_pct = data.budget_variance_percentage(),
        start = data.start_date.format("%d %b %Y"),
        end = data.end_date.format("%d %b %Y"),
        days = data.days_remaining,
        progress = data.progress_percentage,
        tasks = data.total_tasks,
        completed_tasks = data.completed_tasks,
        overdue = data.overdue_tasks,
        maintenance = data.pending_maintenance,
    )
}
