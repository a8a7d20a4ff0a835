//! Integration tests for the repository layer against a real database:
//! - Role-filtered listing for projects, tasks and maintenance requests
//! - Contractor assignment and unassignment
//! - Quotation and invoice creation with line items, and payments
//! - Messaging conversations, notifications and audit queries
//! - Unique and foreign key violations

use buildwise_core::money::Totals;
use buildwise_core::roles::{ROLE_ADMIN, ROLE_CLIENT, ROLE_CONTRACTOR, ROLE_PROJECT_MANAGER};
use buildwise_core::status;
use buildwise_db::models::audit::{AuditQuery, CreateAuditLog};
use buildwise_db::models::invoice::{CreateInvoice, CreatePayment};
use buildwise_db::models::maintenance::{CreateMaintenanceRequest, CreateMaintenanceUpdate};
use buildwise_db::models::message::CreateMessage;
use buildwise_db::models::notification::CreateNotification;
use buildwise_db::models::project::{AssignContractor, CreatePhase, CreateProject, UpdateProject};
use buildwise_db::models::quotation::{CreateQuotation, LineItemInput};
use buildwise_db::models::task::{CreateTask, CreateTaskUpdate, TaskStatusChange};
use buildwise_db::models::user::CreateUser;
use buildwise_db::repositories::{
    AuditLogRepo, DashboardRepo, InvoiceRepo, MaintenanceRepo, MessageRepo, NotificationRepo,
    ProjectContractorRepo, ProjectPhaseRepo, ProjectRepo, QuotationRepo, TaskRepo, UserRepo,
};
use buildwise_db::repositories::invoice_repo::PaymentOutcome;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

async fn user(pool: &PgPool, email: &str, role: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            first_name: email.split('@').next().unwrap().to_string(),
            last_name: "Tester".to_string(),
            role: role.to_string(),
            company: None,
            address: None,
            phone: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn new_project(name: &str, pm: Option<i64>, client: Option<i64>) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        description: String::new(),
        location: "Durban".to_string(),
        start_date: d(2025, 1, 1),
        end_date: d(2025, 12, 31),
        budget: 500_000.0,
        project_manager_id: pm,
        client_id: client,
    }
}

fn new_task(phase_id: Option<i64>, assignee: i64, creator: i64, due: NaiveDate) -> CreateTask {
    CreateTask {
        title: "Pour slab".to_string(),
        description: String::new(),
        due_date: due,
        priority: status::PRIORITY_HIGH.to_string(),
        estimated_cost: 1000.0,
        project_phase_id: phase_id,
        maintenance_request_id: None,
        assigned_to_id: assignee,
        created_by_id: creator,
    }
}

fn task_history(by: i64, change: &str) -> CreateTaskUpdate {
    CreateTaskUpdate {
        updated_by_id: by,
        description: "Status updated".to_string(),
        status_change: Some(change.to_string()),
        cost_update: None,
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_project_visibility_by_role(pool: PgPool) {
    let admin = user(&pool, "admin@example.com", ROLE_ADMIN).await;
    let pm = user(&pool, "pm@example.com", ROLE_PROJECT_MANAGER).await;
    let other_pm = user(&pool, "pm2@example.com", ROLE_PROJECT_MANAGER).await;
    let client = user(&pool, "client@example.com", ROLE_CLIENT).await;
    let contractor = user(&pool, "builder@example.com", ROLE_CONTRACTOR).await;

    let clinic = ProjectRepo::create(&pool, &new_project("Clinic", Some(pm), Some(client)))
        .await
        .unwrap();
    ProjectRepo::create(&pool, &new_project("School", Some(other_pm), None))
        .await
        .unwrap();
    assert_eq!(clinic.status, status::PROJECT_PLANNING);

    let seen = |v: Vec<buildwise_db::models::project::Project>| {
        v.into_iter().map(|p| p.name).collect::<Vec<_>>()
    };

    assert_eq!(
        ProjectRepo::list_for_viewer(&pool, admin, ROLE_ADMIN, 50, 0)
            .await
            .unwrap()
            .len(),
        2
    );
    assert_eq!(
        seen(ProjectRepo::list_for_viewer(&pool, pm, ROLE_PROJECT_MANAGER, 50, 0).await.unwrap()),
        vec!["Clinic"]
    );
    assert_eq!(
        seen(ProjectRepo::list_for_viewer(&pool, client, ROLE_CLIENT, 50, 0).await.unwrap()),
        vec!["Clinic"]
    );
    assert!(ProjectRepo::list_for_viewer(&pool, contractor, ROLE_CONTRACTOR, 50, 0)
        .await
        .unwrap()
        .is_empty());

    ProjectContractorRepo::assign(
        &pool,
        clinic.id,
        &AssignContractor {
            contractor_id: contractor,
            specialization: Some("Plumbing".into()),
            hourly_rate: 350.0,
        },
    )
    .await
    .unwrap();
    assert_eq!(
        seen(ProjectRepo::list_for_viewer(&pool, contractor, ROLE_CONTRACTOR, 50, 0).await.unwrap()),
        vec!["Clinic"]
    );

    assert!(ProjectContractorRepo::unassign(&pool, clinic.id, contractor).await.unwrap());
    assert!(!ProjectContractorRepo::unassign(&pool, clinic.id, contractor).await.unwrap());
    assert!(ProjectRepo::list_for_viewer(&pool, contractor, ROLE_CONTRACTOR, 50, 0)
        .await
        .unwrap()
        .is_empty());
    assert!(ProjectContractorRepo::contractor_ids(&pool, clinic.id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_project_update_and_delete(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Depot", None, None))
        .await
        .unwrap();

    let updated = ProjectRepo::update(
        &pool,
        project.id,
        &UpdateProject {
            status: Some(status::IN_PROGRESS.into()),
            actual_cost: Some(1234.5),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.status, status::IN_PROGRESS);
    assert_eq!(updated.actual_cost, 1234.5);
    assert_eq!(updated.name, "Depot");

    assert!(ProjectRepo::delete(&pool, project.id).await.unwrap());
    assert!(!ProjectRepo::delete(&pool, project.id).await.unwrap());
    assert!(ProjectRepo::update(&pool, project.id, &UpdateProject::default())
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_phase_sort_order_appends(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Mall", None, None))
        .await
        .unwrap();
    let phase = |name: &str| CreatePhase {
        name: name.to_string(),
        description: String::new(),
        start_date: d(2025, 1, 1),
        end_date: d(2025, 2, 1),
        budget: 0.0,
        sort_order: None,
    };

    let first = ProjectPhaseRepo::create(&pool, project.id, &phase("Groundworks"))
        .await
        .unwrap();
    let second = ProjectPhaseRepo::create(&pool, project.id, &phase("Structure"))
        .await
        .unwrap();
    assert_eq!(first.status, status::PHASE_NOT_STARTED);
    assert!(second.sort_order > first.sort_order);
    assert_eq!(ProjectPhaseRepo::count_by_project(&pool, project.id).await.unwrap(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_email_is_unique_violation(pool: PgPool) {
    user(&pool, "dup@example.com", ROLE_CLIENT).await;
    let err = UserRepo::create(
        &pool,
        &CreateUser {
            email: "dup@example.com".into(),
            password_hash: "x".into(),
            first_name: "D".into(),
            last_name: "U".into(),
            role: ROLE_CLIENT.into(),
            company: None,
            address: None,
            phone: None,
        },
    )
    .await
    .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_users_email"));
}

// ---------------------------------------------------------------------------
// Tasks and maintenance
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_task_counts_and_status(pool: PgPool) {
    let pm = user(&pool, "pm@example.com", ROLE_PROJECT_MANAGER).await;
    let builder = user(&pool, "builder@example.com", ROLE_CONTRACTOR).await;
    let stranger = user(&pool, "other@example.com", ROLE_CONTRACTOR).await;
    let project = ProjectRepo::create(&pool, &new_project("Clinic", Some(pm), None))
        .await
        .unwrap();
    let phase = ProjectPhaseRepo::create(
        &pool,
        project.id,
        &CreatePhase {
            name: "Build".into(),
            description: String::new(),
            start_date: d(2025, 1, 1),
            end_date: d(2025, 6, 1),
            budget: 0.0,
            sort_order: None,
        },
    )
    .await
    .unwrap();

    let late = TaskRepo::create(&pool, &new_task(Some(phase.id), builder, pm, d(2025, 2, 1)))
        .await
        .unwrap();
    let done = TaskRepo::create(&pool, &new_task(Some(phase.id), builder, pm, d(2025, 2, 1)))
        .await
        .unwrap();
    TaskRepo::create(&pool, &new_task(Some(phase.id), builder, pm, d(2025, 9, 1)))
        .await
        .unwrap();
    assert_eq!(late.status, status::PENDING);

    TaskRepo::update_status(
        &pool,
        done.id,
        &TaskStatusChange {
            status: status::COMPLETED.into(),
            actual_cost: Some(900.0),
            completed_at: Some(Utc::now()),
        },
        &task_history(builder, "Pending → Completed"),
    )
    .await
    .unwrap()
    .unwrap();
    let history = TaskRepo::list_updates(&pool, done.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status_change.as_deref(), Some("Pending → Completed"));

    let counts = TaskRepo::counts_for_project(&pool, project.id, d(2025, 3, 1))
        .await
        .unwrap();
    assert_eq!(counts.total, 3);
    assert_eq!(counts.completed, 1);
    assert_eq!(counts.overdue, 1);

    assert_eq!(
        TaskRepo::list_for_viewer(&pool, builder, ROLE_CONTRACTOR, 50, 0)
            .await
            .unwrap()
            .len(),
        3
    );
    assert!(TaskRepo::list_for_viewer(&pool, stranger, ROLE_CONTRACTOR, 50, 0)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_maintenance_visibility_and_open_count(pool: PgPool) {
    let client = user(&pool, "client@example.com", ROLE_CLIENT).await;
    let other_client = user(&pool, "client2@example.com", ROLE_CLIENT).await;
    let pm = user(&pool, "pm@example.com", ROLE_PROJECT_MANAGER).await;
    let project = ProjectRepo::create(&pool, &new_project("Flats", Some(pm), Some(client)))
        .await
        .unwrap();

    let request = MaintenanceRepo::create(
        &pool,
        &CreateMaintenanceRequest {
            title: "Leaking geyser".into(),
            description: "Water everywhere".into(),
            priority: status::PRIORITY_HIGH.into(),
            location: "Unit 4".into(),
            property_type: Some("Residential".into()),
            project_id: Some(project.id),
            client_id: client,
            due_date: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(request.status, status::PENDING);

    assert_eq!(
        MaintenanceRepo::list_for_viewer(&pool, client, ROLE_CLIENT, 50, 0)
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(MaintenanceRepo::list_for_viewer(&pool, other_client, ROLE_CLIENT, 50, 0)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        MaintenanceRepo::open_count_for_project(&pool, project.id).await.unwrap(),
        1
    );

    let history = CreateMaintenanceUpdate {
        updated_by_id: pm,
        description: "Geyser replaced".into(),
        status_change: Some("Pending → Completed".into()),
    };
    MaintenanceRepo::update_status(&pool, request.id, status::COMPLETED, Some(Utc::now()), &history)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(MaintenanceRepo::list_updates(&pool, request.id).await.unwrap().len(), 1);
    assert_eq!(
        MaintenanceRepo::open_count_for_project(&pool, project.id).await.unwrap(),
        0
    );

    let samples = MaintenanceRepo::history_samples(&pool, Some(project.id)).await.unwrap();
    assert_eq!(samples.len(), 1);
    assert!(samples[0].completed_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_status_change_rolls_back_without_history(pool: PgPool) {
    let pm = user(&pool, "pm@example.com", ROLE_PROJECT_MANAGER).await;
    let builder = user(&pool, "builder@example.com", ROLE_CONTRACTOR).await;
    let task = TaskRepo::create(&pool, &new_task(None, builder, pm, d(2025, 2, 1)))
        .await
        .unwrap();

    // The history row names a user that does not exist, so its insert fails.
    let result = TaskRepo::update_status(
        &pool,
        task.id,
        &TaskStatusChange {
            status: status::COMPLETED.into(),
            actual_cost: Some(500.0),
            completed_at: Some(Utc::now()),
        },
        &task_history(999_999, "Pending → Completed"),
    )
    .await;
    assert!(result.is_err());

    let unchanged = TaskRepo::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, status::PENDING);
    assert!(unchanged.completed_at.is_none());
    assert!(TaskRepo::list_updates(&pool, task.id).await.unwrap().is_empty());

    let client = user(&pool, "client@example.com", ROLE_CLIENT).await;
    let request = MaintenanceRepo::create(
        &pool,
        &CreateMaintenanceRequest {
            title: "Blocked drain".into(),
            description: "Kitchen".into(),
            priority: status::PRIORITY_MEDIUM.into(),
            location: "Unit 2".into(),
            property_type: None,
            project_id: None,
            client_id: client,
            due_date: None,
        },
    )
    .await
    .unwrap();
    let orphan_history = CreateMaintenanceUpdate {
        updated_by_id: 999_999,
        description: "Cleared".into(),
        status_change: Some("Pending → Completed".into()),
    };
    let result = MaintenanceRepo::update_status(
        &pool,
        request.id,
        status::COMPLETED,
        Some(Utc::now()),
        &orphan_history,
    )
    .await;
    assert!(result.is_err());
    let unchanged = MaintenanceRepo::find_by_id(&pool, request.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, status::PENDING);
    assert!(MaintenanceRepo::list_updates(&pool, request.id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Financials
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_quotation_with_items(pool: PgPool) {
    let pm = user(&pool, "pm@example.com", ROLE_PROJECT_MANAGER).await;
    let client = user(&pool, "client@example.com", ROLE_CLIENT).await;
    let other = user(&pool, "client2@example.com", ROLE_CLIENT).await;

    let items = vec![
        LineItemInput {
            description: "Cement".into(),
            quantity: 10.0,
            unit_price: 95.5,
            category: Some("Materials".into()),
        },
        LineItemInput {
            description: "Labour".into(),
            quantity: 8.0,
            unit_price: 250.0,
            category: None,
        },
    ];
    let totals = Totals::compute(&[(10.0, 95.5), (8.0, 250.0)], 0.15);

    let quotation = QuotationRepo::create(
        &pool,
        &CreateQuotation {
            title: "Boundary wall".into(),
            description: String::new(),
            total_amount: totals.sub_total,
            tax_amount: totals.tax_amount,
            grand_total: totals.total,
            project_id: None,
            maintenance_request_id: None,
            client_id: client,
            created_by_id: pm,
            expires_at: None,
            notes: None,
        },
        &items,
    )
    .await
    .unwrap();
    assert_eq!(quotation.status, status::DRAFT);
    assert_eq!(quotation.total_amount, 2955.0);

    let stored = QuotationRepo::items(&pool, quotation.id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].description, "Cement");
    assert_eq!(stored[0].total_price, 955.0);

    let sent = QuotationRepo::update_status(&pool, quotation.id, status::SENT)
        .await
        .unwrap()
        .unwrap();
    assert!(sent.sent_at.is_some());
    assert!(sent.accepted_at.is_none());

    assert_eq!(
        QuotationRepo::list_for_viewer(&pool, client, ROLE_CLIENT, 50, 0)
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(QuotationRepo::list_for_viewer(&pool, other, ROLE_CLIENT, 50, 0)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invoice_numbering_and_payments(pool: PgPool) {
    let admin = user(&pool, "admin@example.com", ROLE_ADMIN).await;
    let client = user(&pool, "client@example.com", ROLE_CLIENT).await;

    let input = CreateInvoice {
        title: "Phase 1".into(),
        description: String::new(),
        sub_total: 1000.0,
        tax_amount: 150.0,
        total_amount: 1150.0,
        quotation_id: None,
        project_id: None,
        maintenance_request_id: None,
        client_id: client,
        created_by_id: admin,
        due_date: d(2025, 4, 30),
    };
    let first = InvoiceRepo::create(&pool, &input, &[]).await.unwrap();
    let second = InvoiceRepo::create(&pool, &input, &[]).await.unwrap();
    assert!(first.invoice_number.starts_with("INV-"));
    assert_ne!(first.invoice_number, second.invoice_number);
    assert_eq!(first.balance_due, 1150.0);
    assert_eq!(first.status, status::DRAFT);

    let payment = |amount: f64| CreatePayment {
        invoice_id: first.id,
        amount,
        payment_method: "EFT".into(),
        transaction_reference: None,
        notes: None,
        processed_by_id: admin,
    };

    let recorded = |outcome: PaymentOutcome| match outcome {
        PaymentOutcome::Recorded { invoice, .. } => invoice,
        other => panic!("expected a recorded payment, got {other:?}"),
    };

    let partial = recorded(InvoiceRepo::record_payment(&pool, &payment(500.0)).await.unwrap());
    assert_eq!(partial.amount_paid, 500.0);
    assert_eq!(partial.balance_due, 650.0);
    assert_eq!(partial.status, status::DRAFT);

    let paid = recorded(InvoiceRepo::record_payment(&pool, &payment(650.0)).await.unwrap());
    assert_eq!(paid.balance_due, 0.0);
    assert_eq!(paid.status, status::INVOICE_PAID);
    assert!(paid.paid_at.is_some());
    assert_eq!(paid.payment_method.as_deref(), Some("EFT"));

    // A settled invoice is refused under the row lock and nothing is written.
    match InvoiceRepo::record_payment(&pool, &payment(10.0)).await.unwrap() {
        PaymentOutcome::Closed { status: s, invoice_number } => {
            assert_eq!(s, status::INVOICE_PAID);
            assert_eq!(invoice_number, first.invoice_number);
        }
        other => panic!("expected a closed invoice, got {other:?}"),
    }
    assert_eq!(InvoiceRepo::payments(&pool, first.id).await.unwrap().len(), 2);

    let missing = CreatePayment {
        invoice_id: 999_999,
        ..payment(10.0)
    };
    assert!(matches!(
        InvoiceRepo::record_payment(&pool, &missing).await.unwrap(),
        PaymentOutcome::NotFound
    ));
}

// ---------------------------------------------------------------------------
// Messaging, notifications, audit
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_conversations(pool: PgPool) {
    let alice = user(&pool, "alice@example.com", ROLE_CLIENT).await;
    let bob = user(&pool, "bob@example.com", ROLE_PROJECT_MANAGER).await;
    let carol = user(&pool, "carol@example.com", ROLE_CONTRACTOR).await;

    let msg = |from: i64, to: i64, subject: &str| CreateMessage {
        subject: subject.to_string(),
        content: "Hello".to_string(),
        sender_id: from,
        recipient_id: to,
        project_id: None,
        maintenance_request_id: None,
        task_id: None,
        message_type: status::MESSAGE_GENERAL.to_string(),
    };

    MessageRepo::create(&pool, &msg(bob, alice, "Site visit")).await.unwrap();
    MessageRepo::create(&pool, &msg(alice, bob, "Re: Site visit")).await.unwrap();
    let last = MessageRepo::create(&pool, &msg(carol, alice, "Quote")).await.unwrap();

    assert_eq!(MessageRepo::unread_count(&pool, alice).await.unwrap(), 2);

    let conversations = MessageRepo::conversations(&pool, alice).await.unwrap();
    assert_eq!(conversations.len(), 2);
    assert_eq!(conversations[0].partner_id, carol);
    assert_eq!(conversations[0].last_message_id, last.id);
    assert_eq!(conversations[0].unread_count, 1);
    assert_eq!(conversations[1].partner_id, bob);
    assert_eq!(conversations[1].last_subject, "Re: Site visit");

    let thread = MessageRepo::conversation_with(&pool, alice, bob).await.unwrap();
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0].subject, "Site visit");
    assert_eq!(thread[0].sender_name, "bob Tester");

    assert_eq!(MessageRepo::mark_conversation_read(&pool, alice, bob).await.unwrap(), 1);
    assert!(MessageRepo::mark_read(&pool, last.id).await.unwrap().is_some());
    assert!(MessageRepo::mark_read(&pool, last.id).await.unwrap().is_none());
    assert_eq!(MessageRepo::unread_count(&pool, alice).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_notifications_read_flow(pool: PgPool) {
    let user_id = user(&pool, "n@example.com", ROLE_CLIENT).await;
    let other = user(&pool, "o@example.com", ROLE_CLIENT).await;

    let first = NotificationRepo::create(&pool, &CreateNotification::in_app(user_id, "A", "a"))
        .await
        .unwrap();
    NotificationRepo::create(&pool, &CreateNotification::in_app(user_id, "B", "b"))
        .await
        .unwrap();
    assert_eq!(first.status, status::PENDING);
    assert_eq!(NotificationRepo::unread_count(&pool, user_id).await.unwrap(), 2);

    assert!(NotificationRepo::mark_read(&pool, first.id, other).await.unwrap().is_none());
    let read = NotificationRepo::mark_read(&pool, first.id, user_id)
        .await
        .unwrap()
        .unwrap();
    assert!(read.is_read);
    assert_eq!(read.status, status::NOTIFICATION_DELIVERED);

    assert_eq!(NotificationRepo::mark_all_read(&pool, user_id).await.unwrap(), 1);
    assert_eq!(NotificationRepo::unread_count(&pool, user_id).await.unwrap(), 0);
    assert!(NotificationRepo::list_for_user(&pool, user_id, true, 50, 0)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_audit_query_filters(pool: PgPool) {
    let admin = user(&pool, "admin@example.com", ROLE_ADMIN).await;
    for (action, entity_id) in [("Create", 1), ("Update", 1), ("Delete", 2)] {
        AuditLogRepo::insert(
            &pool,
            &CreateAuditLog {
                entity_type: "Project".into(),
                entity_id,
                action: action.into(),
                user_id: Some(admin),
                old_values: None,
                new_values: Some(serde_json::json!({ "name": "Clinic" })),
                description: None,
                ip_address: Some("127.0.0.1".into()),
                user_agent: None,
            },
        )
        .await
        .unwrap();
    }

    let all = AuditQuery::default();
    assert_eq!(AuditLogRepo::count(&pool, &all).await.unwrap(), 3);

    let by_entity = AuditQuery {
        entity_type: Some("Project".into()),
        entity_id: Some(1),
        ..Default::default()
    };
    assert_eq!(AuditLogRepo::count(&pool, &by_entity).await.unwrap(), 2);
    let rows = AuditLogRepo::query(&pool, &by_entity).await.unwrap();
    assert_eq!(rows[0].action, "Update");

    let page = AuditQuery {
        limit: Some(1),
        offset: Some(1),
        ..Default::default()
    };
    assert_eq!(AuditLogRepo::query(&pool, &page).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_dashboard_counts(pool: PgPool) {
    let pm = user(&pool, "pm@example.com", ROLE_PROJECT_MANAGER).await;
    let builder = user(&pool, "builder@example.com", ROLE_CONTRACTOR).await;
    let project = ProjectRepo::create(&pool, &new_project("Clinic", Some(pm), None))
        .await
        .unwrap();
    ProjectRepo::update(
        &pool,
        project.id,
        &UpdateProject {
            status: Some(status::IN_PROGRESS.into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    TaskRepo::create(&pool, &new_task(None, builder, pm, d(2025, 1, 1)))
        .await
        .unwrap();

    let counts = DashboardRepo::counts(&pool, pm, ROLE_PROJECT_MANAGER, d(2025, 6, 1))
        .await
        .unwrap();
    assert_eq!(counts.total_projects, 1);
    assert_eq!(counts.active_projects, 1);
    assert_eq!(counts.total_tasks, 1);
    assert_eq!(counts.overdue_tasks, 1);
    assert_eq!(counts.unread_messages, 0);

    let builder_counts = DashboardRepo::counts(&pool, builder, ROLE_CONTRACTOR, d(2025, 6, 1))
        .await
        .unwrap();
    assert_eq!(builder_counts.total_projects, 0);
    assert_eq!(builder_counts.total_tasks, 1);

    let chart = DashboardRepo::project_status_counts(&pool, pm, ROLE_PROJECT_MANAGER)
        .await
        .unwrap();
    assert_eq!(chart.len(), 1);
    assert_eq!(chart[0].label, status::IN_PROGRESS);
    assert_eq!(chart[0].count, 1);
}
