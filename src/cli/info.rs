use serde::Serialize;

use crate::store::Store;
use crate::types::{ApprovalStatus, InvoiceStatus, Role};

use super::init_store;

#[derive(Serialize)]
struct ClientCounts {
    pending: usize,
    approved: usize,
    rejected: usize,
}

#[derive(Serialize)]
struct InvoiceCounts {
    total: usize,
    pending: usize,
    paid: usize,
    overdue: usize,
}

#[derive(Serialize)]
struct PortalInfo {
    users: usize,
    admins: usize,
    clients: ClientCounts,
    tokens: usize,
    projects: usize,
    active_projects: i64,
    contracts: usize,
    contracts_signed: usize,
    invoices: InvoiceCounts,
    deliverables: usize,
}

pub fn run_info(data_dir: String, json: bool) -> anyhow::Result<()> {
    let store = init_store(&data_dir)?;

    let users = store.list_users("", 10000)?;
    let tokens = store.list_tokens("", 10000)?;
    let onboarding = store.list_onboarding(None)?;
    let contracts = store.list_contracts()?;
    let invoices = store.list_invoices()?;
    let stats = store.dashboard_stats()?;

    let clients_with = |status: ApprovalStatus| {
        onboarding
            .iter()
            .filter(|o| o.approval_status == status)
            .count()
    };
    let invoices_with =
        |status: InvoiceStatus| invoices.iter().filter(|i| i.status == status).count();

    let info = PortalInfo {
        users: users.len(),
        admins: users.iter().filter(|u| u.role == Role::Admin).count(),
        clients: ClientCounts {
            pending: clients_with(ApprovalStatus::Pending),
            approved: clients_with(ApprovalStatus::Approved),
            rejected: clients_with(ApprovalStatus::Rejected),
        },
        tokens: tokens.len(),
        projects: store.list_projects()?.len(),
        active_projects: stats.active_projects,
        contracts: contracts.len(),
        contracts_signed: contracts.iter().filter(|c| c.is_signed).count(),
        invoices: InvoiceCounts {
            total: invoices.len(),
            pending: invoices_with(InvoiceStatus::Pending),
            paid: invoices_with(InvoiceStatus::Paid),
            overdue: invoices_with(InvoiceStatus::Overdue),
        },
        deliverables: store.list_deliverables()?.len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!();
    println!("Keyline Portal Status");
    println!("{}", "─".repeat(21));
    println!("Users:         {} ({} admin)", info.users, info.admins);
    println!(
        "Clients:       {} pending, {} approved, {} rejected",
        info.clients.pending, info.clients.approved, info.clients.rejected
    );
    println!("Tokens:        {}", info.tokens);
    println!(
        "Projects:      {} ({} active)",
        info.projects, info.active_projects
    );
    println!(
        "Contracts:     {} ({} signed)",
        info.contracts, info.contracts_signed
    );
    println!(
        "Invoices:      {} ({} pending, {} paid, {} overdue)",
        info.invoices.total, info.invoices.pending, info.invoices.paid, info.invoices.overdue
    );
    println!("Deliverables:  {}", info.deliverables);
    println!();

    Ok(())
}
