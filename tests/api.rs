mod common;

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

use common::{SIGNATURE, TestServer};

async fn body(res: reqwest::Response) -> Value {
    res.json().await.expect("json body")
}

#[tokio::test]
async fn test_health_and_auth_errors() {
    let server = TestServer::start().await;

    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "OK");

    let res = server
        .client
        .get(server.url("/api/v1/session"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
    let challenge = res.headers()["www-authenticate"].to_str().unwrap().to_string();
    assert!(challenge.starts_with("Bearer"));
    assert_eq!(body(res).await["error"], "Authentication required");

    let res = server.get("/api/v1/session", "kl_bogus").send().await.unwrap();
    assert_eq!(res.status(), 401);

    let (_, token) = server.create_client("dana@example.com", "Dana");
    let res = server.get("/api/v1/admin/users", &token).send().await.unwrap();
    assert_eq!(res.status(), 403);
    assert_eq!(body(res).await["error"], "Admin access required");

    let res = server
        .get("/api/v1/onboarding", &server.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);
}

#[tokio::test]
async fn test_admin_session_view() {
    let server = TestServer::start().await;

    let res = server
        .get("/api/v1/session", &server.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let session = body(res).await;
    assert_eq!(session["error"], Value::Null);
    assert_eq!(session["data"]["role"], "admin");
    assert_eq!(session["data"]["view"], json!({ "kind": "admin" }));
}

#[tokio::test]
async fn test_onboarding_to_active_flow() {
    let server = TestServer::start().await;
    let (client, token) = server.create_client("dana@example.com", "Dana Reyes");

    let view = |session: Value| session["data"]["view"].clone();

    let session = body(server.get("/api/v1/session", &token).send().await.unwrap()).await;
    assert_eq!(view(session), json!({ "kind": "client", "state": "no_account" }));

    // Intake is required before review, and accepted only once.
    let res = server
        .put("/api/v1/onboarding", &token)
        .json(&json!({ "company_name": "", "project_description": "New site" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let intake = json!({
        "company_name": "Reyes Bakery",
        "project_description": "A new website",
        "inspiration_images": ["uploads/x/1.png"],
    });
    let res = server
        .put("/api/v1/onboarding", &token)
        .json(&intake)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let onboarding = body(res).await;
    assert_eq!(onboarding["data"]["company_name"], "Reyes Bakery");
    assert!(onboarding["data"]["submitted_at"].is_string());

    let res = server
        .put("/api/v1/onboarding", &token)
        .json(&intake)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);

    let session = body(server.get("/api/v1/session", &token).send().await.unwrap()).await;
    assert_eq!(view(session), json!({ "kind": "client", "state": "pending_review" }));

    let res = server.get("/api/v1/projects", &token).send().await.unwrap();
    assert_eq!(res.status(), 403);

    // Review
    let pending = body(
        server
            .get("/api/v1/admin/clients?status=pending", &server.admin_token)
            .send()
            .await
            .unwrap(),
    )
    .await;
    let rows = pending["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["email"], "dana@example.com");

    let res = server
        .get("/api/v1/admin/clients?status=maybe", &server.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = server
        .post(
            &format!("/api/v1/admin/clients/{}/approve", client.id()),
            &server.admin_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(body(res).await["data"]["approval_status"], "approved");

    let emails = server.mailer.wait_for(1).await;
    assert_eq!(emails[0].subject, "You're Approved! - Keyline Studios");
    assert_eq!(emails[0].to, vec!["dana@example.com".to_string()]);
    assert!(emails[0].html.contains("Dana Reyes"));

    let session = body(server.get("/api/v1/session", &token).send().await.unwrap()).await;
    assert_eq!(
        view(session),
        json!({ "kind": "client", "state": "awaiting_contract", "contract_sent": false })
    );

    // Contract without a project creates one named after project_name.
    let res = server
        .post("/api/v1/admin/contracts", &server.admin_token)
        .json(&json!({
            "client_id": client.id(),
            "title": "Website Agreement",
            "content": "Scope, timeline and payment terms.",
            "project_name": "Bakery Website",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let contract = body(res).await;
    let contract_id = contract["data"]["id"].as_str().unwrap().to_string();
    let project_id = contract["data"]["project_id"].as_str().unwrap().to_string();
    assert_eq!(contract["data"]["is_signed"], false);
    assert_eq!(contract["data"]["project_name"], "Bakery Website");

    let emails = server.mailer.wait_for(2).await;
    assert_eq!(emails[1].subject, "Your Contract is Ready - Keyline Studios");

    let session = body(server.get("/api/v1/session", &token).send().await.unwrap()).await;
    assert_eq!(
        view(session),
        json!({ "kind": "client", "state": "awaiting_contract", "contract_sent": true })
    );

    let res = server.get("/api/v1/projects", &token).send().await.unwrap();
    assert_eq!(res.status(), 403);

    // Signing
    let sign_path = format!("/api/v1/contracts/{contract_id}/sign");
    let res = server
        .post(&sign_path, &token)
        .json(&json!({ "signature_data": "not-an-image" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = server
        .post(&sign_path, &token)
        .json(&json!({ "signature_data": SIGNATURE }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let signed = body(res).await;
    assert_eq!(signed["data"]["contract"]["is_signed"], true);
    assert!(signed["data"]["contract"]["signed_at"].is_string());
    assert_eq!(signed["data"]["view"], json!({ "state": "active" }));

    let res = server
        .post(&sign_path, &token)
        .json(&json!({ "signature_data": SIGNATURE }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);

    let res = server
        .patch(
            &format!("/api/v1/admin/contracts/{contract_id}"),
            &server.admin_token,
        )
        .json(&json!({ "title": "Changed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);

    let session = body(server.get("/api/v1/session", &token).send().await.unwrap()).await;
    assert_eq!(view(session), json!({ "kind": "client", "state": "active" }));

    let projects = body(server.get("/api/v1/projects", &token).send().await.unwrap()).await;
    let projects = projects["data"].as_array().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["id"], project_id.as_str());
    assert_eq!(projects[0]["name"], "Bakery Website");
}

#[tokio::test]
async fn test_rejected_client_is_kept_out() {
    let server = TestServer::start().await;
    let (client, token) = server.create_client("rex@example.com", "Rex");

    server
        .put("/api/v1/onboarding", &token)
        .json(&json!({ "company_name": "Rex Co", "project_description": "Logo" }))
        .send()
        .await
        .unwrap();

    let res = server
        .post(
            &format!("/api/v1/admin/clients/{}/reject", client.id()),
            &server.admin_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let session = body(server.get("/api/v1/session", &token).send().await.unwrap()).await;
    assert_eq!(
        session["data"]["view"],
        json!({ "kind": "client", "state": "rejected" })
    );

    let res = server
        .post("/api/v1/admin/clients/missing-user/approve", &server.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_projects_are_scoped_to_their_client() {
    let server = TestServer::start().await;
    let (_, token_a, project_a) = server.active_client("a@example.com", "Ada").await;
    let (_, token_b, _) = server.active_client("b@example.com", "Bo").await;

    let res = server
        .get(&format!("/api/v1/projects/{project_a}"), &token_a)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let res = server
        .get(&format!("/api/v1/projects/{project_a}"), &token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let res = server
        .get(&format!("/api/v1/projects/{project_a}/messages"), &token_b)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_internal_notes_hidden_from_client() {
    let server = TestServer::start().await;
    let (_, token, project_id) = server.active_client("dana@example.com", "Dana").await;

    let res = server
        .patch(
            &format!("/api/v1/admin/projects/{project_id}"),
            &server.admin_token,
        )
        .json(&json!({ "internal_notes": "Slow to reply", "health_status": "needs_attention" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let admin_view = body(res).await;
    assert_eq!(admin_view["data"]["internal_notes"], "Slow to reply");
    assert_eq!(admin_view["data"]["health_status"], "needs_attention");

    let client_view = body(
        server
            .get(&format!("/api/v1/projects/{project_id}"), &token)
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(client_view["data"]["health_status"], "needs_attention");
    assert!(client_view["data"].get("internal_notes").is_none());
}

#[tokio::test]
async fn test_project_status_notifications() {
    let server = TestServer::start().await;
    let (_, _, project_id) = server.active_client("dana@example.com", "Dana").await;
    server.mailer.wait_for(1).await;

    let path = format!("/api/v1/admin/projects/{project_id}");

    let res = server
        .patch(&path, &server.admin_token)
        .json(&json!({ "status": "design" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let emails = server.mailer.wait_for(2).await;
    assert_eq!(emails[1].subject, "Project Update - Keyline Studios");

    // Same status again: nothing to report.
    server
        .patch(&path, &server.admin_token)
        .json(&json!({ "status": "design" }))
        .send()
        .await
        .unwrap();

    let res = server
        .patch(&path, &server.admin_token)
        .json(&json!({ "status": "delivered" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    server.mailer.wait_for(3).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let subjects = server.mailer.subjects();
    assert_eq!(subjects.len(), 3);
    let completed: Vec<_> = subjects
        .iter()
        .filter(|s| s.starts_with("Your Project is Complete!"))
        .collect();
    assert_eq!(completed.len(), 1);
    assert!(!subjects[2].starts_with("Project Update"));

    let res = server
        .patch(&path, &server.admin_token)
        .json(&json!({ "status": "finished" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 422);
}

#[tokio::test]
async fn test_milestones_and_launch_summary() {
    let server = TestServer::start().await;
    let (_, token, project_id) = server.active_client("dana@example.com", "Dana").await;

    let milestones_path = format!("/api/v1/admin/projects/{project_id}/milestones");
    let first = body(
        server
            .post(&milestones_path, &server.admin_token)
            .json(&json!({ "title": "Kickoff" }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(first["data"]["sort_order"], 0);

    let second = body(
        server
            .post(&milestones_path, &server.admin_token)
            .json(&json!({ "title": "Wireframes", "due_date": "2026-11-01" }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(second["data"]["sort_order"], 1);

    let milestone_id = first["data"]["id"].as_str().unwrap();
    let updated = body(
        server
            .patch(
                &format!("/api/v1/admin/milestones/{milestone_id}"),
                &server.admin_token,
            )
            .json(&json!({ "is_completed": true }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(updated["data"]["is_completed"], true);
    assert!(updated["data"]["completed_at"].is_string());

    let listed = body(
        server
            .get(&format!("/api/v1/projects/{project_id}/milestones"), &token)
            .send()
            .await
            .unwrap(),
    )
    .await;
    let titles: Vec<_> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Kickoff", "Wireframes"]);

    let second_id = second["data"]["id"].as_str().unwrap();
    let res = server
        .delete(
            &format!("/api/v1/admin/milestones/{second_id}"),
            &server.admin_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let summary = body(
        server
            .patch(
                &format!("/api/v1/admin/projects/{project_id}"),
                &server.admin_token,
            )
            .json(&json!({ "support_plan": "priority" }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(summary["data"]["support_plan"], "priority");

    let summary = body(
        server
            .get(
                &format!("/api/v1/admin/projects/{project_id}/launch-summary"),
                &server.admin_token,
            )
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(summary["data"]["client_email"], "dana@example.com");
    assert_eq!(summary["data"]["approvals"].as_array().unwrap().len(), 4);
    assert!(summary["data"]["support_plan"].is_object());
}

#[tokio::test]
async fn test_invoices() {
    let server = TestServer::start().await;
    let (_, token, project_id) = server.active_client("dana@example.com", "Dana").await;
    server.mailer.wait_for(1).await;

    let res = server
        .post("/api/v1/admin/invoices", &server.admin_token)
        .json(&json!({
            "project_id": project_id,
            "amount": "19.99",
            "description": "Domain renewal",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let invoice = body(res).await;
    assert_eq!(invoice["data"]["amount"], 1999);
    assert_eq!(invoice["data"]["currency"], "usd");
    assert_eq!(invoice["data"]["status"], "pending");
    assert_eq!(invoice["data"]["formatted_amount"], "$19.99");
    let invoice_id = invoice["data"]["id"].as_str().unwrap().to_string();

    let res = server
        .post("/api/v1/admin/invoices", &server.admin_token)
        .json(&json!({
            "project_id": project_id,
            "amount": 250,
            "description": "Design deposit",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    let emails = server.mailer.wait_for(3).await;
    let deposit = emails
        .iter()
        .find(|e| e.html.contains("Design deposit"))
        .expect("deposit email");
    assert_eq!(deposit.subject, "New Invoice - Keyline Studios");
    assert!(deposit.html.contains("$250.00"));

    for bad in [json!("abc"), json!(""), json!(-5)] {
        let res = server
            .post("/api/v1/admin/invoices", &server.admin_token)
            .json(&json!({ "project_id": project_id, "amount": bad, "description": "x" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400, "amount {bad}");
    }

    let status_path = format!("/api/v1/admin/invoices/{invoice_id}/status");
    let paid = body(
        server
            .patch(&status_path, &server.admin_token)
            .json(&json!({ "status": "paid" }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(paid["data"]["status"], "paid");
    assert!(paid["data"]["paid_at"].is_string());

    let pending = body(
        server
            .patch(&status_path, &server.admin_token)
            .json(&json!({ "status": "pending" }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(pending["data"]["status"], "pending");
    assert!(pending["data"]["paid_at"].is_null());

    let res = server
        .patch(&status_path, &server.admin_token)
        .json(&json!({ "status": "refunded" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = server
        .patch("/api/v1/admin/invoices/missing/status", &server.admin_token)
        .json(&json!({ "status": "paid" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let listed = body(
        server
            .get(&format!("/api/v1/projects/{project_id}/invoices"), &token)
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_deliverables() {
    let server = TestServer::start().await;
    let (_, token, project_id) = server.active_client("dana@example.com", "Dana").await;
    server.mailer.wait_for(1).await;

    let res = server
        .post("/api/v1/admin/deliverables", &server.admin_token)
        .json(&json!({ "project_id": project_id, "title": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = server
        .post("/api/v1/admin/deliverables", &server.admin_token)
        .json(&json!({ "project_id": project_id, "title": "Brand Guide" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = server
        .post("/api/v1/admin/deliverables", &server.admin_token)
        .json(&json!({
            "project_id": project_id,
            "title": "Figma File",
            "external_link": "https://figma.com/file/abc",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let linked = body(res).await;
    assert_eq!(linked["data"]["version"], 1);
    assert_eq!(linked["data"]["is_delivered"], true);
    assert_eq!(linked["data"]["file_type"], "document");
    let linked_id = linked["data"]["id"].as_str().unwrap().to_string();

    let contents = b"%PDF-1.4 brand guide".to_vec();
    let form = Form::new()
        .text("project_id", project_id.clone())
        .text("title", "Brand Guide")
        .text("file_type", "pdf")
        .part(
            "file",
            Part::bytes(contents.clone())
                .file_name("brand guide.pdf")
                .mime_str("application/pdf")
                .unwrap(),
        );
    let res = server
        .post("/api/v1/admin/deliverables/upload", &server.admin_token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let uploaded = body(res).await;
    let file_url = uploaded["data"]["file_url"].as_str().unwrap().to_string();
    assert!(file_url.starts_with(&format!("{}/files/deliverables/", server.base_url)));
    assert!(file_url.ends_with("-brand_guide.pdf"));

    let res = server.client.get(&file_url).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/pdf");
    assert_eq!(res.bytes().await.unwrap().to_vec(), contents);

    let emails = server.mailer.wait_for(3).await;
    assert!(emails.iter().any(|e| {
        e.subject == "New Deliverable Ready - Keyline Studios" && e.html.contains("Brand Guide")
    }));

    // A new link counts as a new version; withdrawing hides it from the client.
    let updated = body(
        server
            .patch(
                &format!("/api/v1/admin/deliverables/{linked_id}"),
                &server.admin_token,
            )
            .json(&json!({ "external_link": "https://figma.com/file/v2", "is_delivered": false }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(updated["data"]["version"], 2);
    assert_eq!(updated["data"]["is_delivered"], false);
    assert!(updated["data"].get("delivered_at").is_none());

    let visible = body(
        server
            .get(&format!("/api/v1/projects/{project_id}/deliverables"), &token)
            .send()
            .await
            .unwrap(),
    )
    .await;
    let visible = visible["data"].as_array().unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["title"], "Brand Guide");

    let res = server
        .delete(
            &format!("/api/v1/admin/deliverables/{linked_id}"),
            &server.admin_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let res = server
        .delete(
            &format!("/api/v1/admin/deliverables/{linked_id}"),
            &server.admin_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_files_reject_bad_paths() {
    let server = TestServer::start().await;

    let res = server
        .client
        .get(server.url("/files/uploads/nobody/missing.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let res = server
        .client
        .get(server.url("/files/.tmp/partial"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_messages() {
    let server = TestServer::start().await;
    let (client, token, project_id) = server.active_client("dana@example.com", "Dana").await;
    server.mailer.wait_for(1).await;

    let client_path = format!("/api/v1/projects/{project_id}/messages");
    let admin_path = format!("/api/v1/admin/projects/{project_id}/messages");

    let res = server
        .post(&client_path, &token)
        .json(&json!({ "content": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = server
        .post(&client_path, &token)
        .json(&json!({ "content": "Hi! Any news?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    let res = server
        .post(&admin_path, &server.admin_token)
        .json(&json!({ "content": "Mockups land Friday." }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    let emails = server.mailer.wait_for(2).await;
    assert_eq!(emails[1].subject, "New Message - Keyline Studios");

    let listed = body(server.get(&client_path, &token).send().await.unwrap()).await;
    let listed = listed["data"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["content"], "Hi! Any news?");
    assert_eq!(listed[0]["sender_id"], client.id());
    assert_eq!(listed[1]["content"], "Mockups land Friday.");
    assert_eq!(listed[1]["is_read"], false);

    // Only messages from the other party are marked read.
    let marked = body(
        server
            .post(&format!("{client_path}/read"), &token)
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(marked["data"]["updated"], 1);

    let listed = body(server.get(&admin_path, &server.admin_token).send().await.unwrap()).await;
    assert_eq!(listed["data"][0]["is_read"], false);
    assert_eq!(listed["data"][1]["is_read"], true);
}

#[tokio::test]
async fn test_message_stream() {
    let server = TestServer::start().await;
    let (_, token, project_id) = server.active_client("dana@example.com", "Dana").await;

    let mut stream = server
        .get(&format!("/api/v1/projects/{project_id}/messages/stream"), &token)
        .send()
        .await
        .unwrap();
    assert_eq!(stream.status(), 200);
    assert!(
        stream.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let res = server
        .post(
            &format!("/api/v1/admin/projects/{project_id}/messages"),
            &server.admin_token,
        )
        .json(&json!({ "content": "Live update" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let sent = body(res).await;
    let message_id = sent["data"]["id"].as_str().unwrap().to_string();

    let mut received = String::new();
    while !received.contains("Live update") {
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.chunk())
            .await
            .expect("stream timed out")
            .unwrap()
            .expect("stream ended");
        received.push_str(&String::from_utf8_lossy(&chunk));
    }

    assert!(received.contains("event: message"));
    assert!(received.contains(&format!("id: {message_id}")));
}

#[tokio::test]
async fn test_approvals() {
    let server = TestServer::start().await;
    let (_, token, project_id) = server.active_client("dana@example.com", "Dana").await;
    let path = format!("/api/v1/projects/{project_id}/approvals");

    let checklist = body(server.get(&path, &token).send().await.unwrap()).await;
    let steps = checklist["data"].as_array().unwrap();
    assert_eq!(steps.len(), 4);
    assert_eq!(steps[0]["approval_type"], "design_approval");
    assert!(steps.iter().all(|s| s["approval"].is_null()));

    let res = server
        .post(&path, &token)
        .json(&json!({ "approval_type": "design_approval", "notes": "Love it" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    assert_eq!(body(res).await["data"]["notes"], "Love it");

    let res = server
        .post(&path, &token)
        .json(&json!({ "approval_type": "design_approval" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);

    let res = server
        .post(&path, &token)
        .json(&json!({ "approval_type": "vibe_approval" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let checklist = body(server.get(&path, &token).send().await.unwrap()).await;
    let steps = checklist["data"].as_array().unwrap();
    assert_eq!(steps.len(), 4);
    assert!(steps[0]["approval"].is_object());
    assert!(steps[1]["approval"].is_null());
}

#[tokio::test]
async fn test_upload_function() {
    let server = TestServer::start().await;
    let (client, token) = server.create_client("dana@example.com", "Dana");

    let form = || Form::new().part("file", Part::bytes(b"png".to_vec()).file_name("logo.png"));

    let res = server
        .client
        .post(server.url("/functions/upload-file"))
        .multipart(form())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);
    assert!(body(res).await["error"].is_string());

    let res = server
        .post("/functions/upload-file", &token)
        .multipart(Form::new().text("folder", "logos"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    assert_eq!(body(res).await["error"], "No file provided");

    let res = server
        .post("/functions/upload-file", &token)
        .multipart(form())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let uploaded = body(res).await;
    let path = uploaded["path"].as_str().unwrap();
    assert!(path.starts_with(&format!("uploads/{}/", client.id())));
    assert!(path.ends_with("-logo.png"));

    let public_url = uploaded["publicUrl"].as_str().unwrap();
    assert_eq!(public_url, format!("{}/files/{path}", server.base_url));
    let res = server.client.get(public_url).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.bytes().await.unwrap().as_ref(), b"png");

    let res = server
        .post("/functions/upload-file", &token)
        .multipart(form().text("folder", "../secrets"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn test_send_notification_function() {
    let server = TestServer::start().await;
    let (client, token) = server.create_client("dana@example.com", "Dana");

    let res = server
        .post("/functions/send-notification", &token)
        .json(&json!({ "type": "contract_sent", "clientId": client.id() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);

    let res = server
        .post("/functions/send-notification", &server.admin_token)
        .json(&json!({ "type": "birthday", "clientId": client.id() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    assert!(body(res).await["error"].is_string());

    let res = server
        .post("/functions/send-notification", &server.admin_token)
        .json(&json!({ "type": "contract_sent", "clientId": "no-such-user" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let res = server
        .post("/functions/send-notification", &server.admin_token)
        .json(&json!({
            "type": "invoice_created",
            "clientId": client.id(),
            "data": { "amount": "$40.00", "description": "<b>Hosting</b>" },
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let reply = body(res).await;
    assert_eq!(reply["success"], true);
    assert_eq!(reply["emailResponse"]["id"], "test-email");

    let emails = server.mailer.emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].subject, "New Invoice - Keyline Studios");
    assert_eq!(emails[0].from, "Keyline Studios <hello@keylinestudios.com>");
    assert!(emails[0].html.contains("$40.00"));
    assert!(emails[0].html.contains("&lt;b&gt;Hosting&lt;/b&gt;"));
}

#[tokio::test]
async fn test_admin_users_and_tokens() {
    let server = TestServer::start().await;

    let res = server
        .post("/api/v1/admin/users", &server.admin_token)
        .json(&json!({ "email": "New@Example.com", "role": "client", "full_name": "Nia" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let user = body(res).await;
    assert_eq!(user["data"]["email"], "new@example.com");
    let user_id = user["data"]["user_id"].as_str().unwrap().to_string();

    let res = server
        .post("/api/v1/admin/users", &server.admin_token)
        .json(&json!({ "email": "new@example.com", "role": "client" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 409);

    let res = server
        .post("/api/v1/admin/users", &server.admin_token)
        .json(&json!({ "email": "not-an-email", "role": "client" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = server
        .post(
            &format!("/api/v1/admin/users/{user_id}/tokens"),
            &server.admin_token,
        )
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let created = body(res).await;
    let token = created["data"]["token"].as_str().unwrap().to_string();
    let token_id = created["data"]["id"].as_str().unwrap().to_string();

    let session = body(server.get("/api/v1/session", &token).send().await.unwrap()).await;
    assert_eq!(session["data"]["email"], "new@example.com");

    let res = server
        .delete(&format!("/api/v1/admin/tokens/{token_id}"), &server.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);

    let res = server.get("/api/v1/session", &token).send().await.unwrap();
    assert_eq!(res.status(), 401);

    // The admin cannot revoke the token it is calling with.
    let tokens = body(
        server
            .get(
                &format!("/api/v1/admin/users/{}/tokens", server.admin.id()),
                &server.admin_token,
            )
            .send()
            .await
            .unwrap(),
    )
    .await;
    let own_id = tokens["data"][0]["id"].as_str().unwrap().to_string();
    let res = server
        .delete(&format!("/api/v1/admin/tokens/{own_id}"), &server.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn test_reject_after_approval_keeps_approved_at() {
    let server = TestServer::start().await;
    let (client, _) = server.approved_client("rex@example.com", "Rex");

    let rejected = body(
        server
            .post(
                &format!("/api/v1/admin/clients/{}/reject", client.id()),
                &server.admin_token,
            )
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(rejected["data"]["approval_status"], "rejected");
    assert!(rejected["data"]["approved_at"].is_string());
}

#[tokio::test]
async fn test_sign_checks_ownership_before_signature() {
    let server = TestServer::start().await;
    let (owner, owner_token) = server.approved_client("dana@example.com", "Dana");
    let (_, other_token) = server.create_client("lee@example.com", "Lee");

    let contract = body(
        server
            .post("/api/v1/admin/contracts", &server.admin_token)
            .json(&json!({
                "client_id": owner.id(),
                "title": "Website Agreement",
                "content": "Scope and terms",
            }))
            .send()
            .await
            .unwrap(),
    )
    .await;
    let sign_path = format!(
        "/api/v1/contracts/{}/sign",
        contract["data"]["id"].as_str().unwrap()
    );

    for signature in ["not-an-image", SIGNATURE] {
        let res = server
            .post(&sign_path, &other_token)
            .json(&json!({ "signature_data": signature }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 404);
    }

    let res = server
        .post("/api/v1/contracts/missing/sign", &owner_token)
        .json(&json!({ "signature_data": "not-an-image" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let res = server
        .post(&sign_path, &owner_token)
        .json(&json!({ "signature_data": "not-an-image" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn test_launch_date_set_and_cleared() {
    let server = TestServer::start().await;
    let (_, _, project_id) = server.active_client("dana@example.com", "Dana").await;
    let project_path = format!("/api/v1/admin/projects/{project_id}");

    let patch = |payload: Value| {
        server
            .patch(&project_path, &server.admin_token)
            .json(&payload)
            .send()
    };

    let res = patch(json!({ "launch_date": "2026-11-01T00:00:00Z" }))
        .await
        .unwrap();
    assert_eq!(
        body(res).await["data"]["launch_date"],
        "2026-11-01T00:00:00Z"
    );

    // Absent leaves it alone.
    let res = patch(json!({ "launch_notes": "Soft launch" })).await.unwrap();
    assert_eq!(
        body(res).await["data"]["launch_date"],
        "2026-11-01T00:00:00Z"
    );

    let res = patch(json!({ "launch_date": null })).await.unwrap();
    assert_eq!(res.status(), 200);
    let stored = body(
        server
            .get(&project_path, &server.admin_token)
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert!(stored["data"].get("launch_date").is_none());
    assert_eq!(stored["data"]["launch_notes"], "Soft launch");

    let res = patch(json!({ "launch_date": "2026-12-24" })).await.unwrap();
    assert_eq!(
        body(res).await["data"]["launch_date"],
        "2026-12-24T00:00:00Z"
    );

    let res = patch(json!({ "launch_date": "" })).await.unwrap();
    assert!(body(res).await["data"].get("launch_date").is_none());

    let res = patch(json!({ "launch_date": "soon" })).await.unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let server = TestServer::start().await;

    let stats = body(
        server
            .get("/api/v1/admin/stats", &server.admin_token)
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(
        stats["data"],
        json!({ "pending_approvals": 0, "active_projects": 0, "pending_invoices": 0 })
    );

    let (_, pending_token) = server.create_client("lee@example.com", "Lee");
    let (_, _, project_id) = server.active_client("dana@example.com", "Dana").await;
    let res = server
        .post("/api/v1/admin/invoices", &server.admin_token)
        .json(&json!({
            "project_id": project_id,
            "amount": "500",
            "description": "Deposit",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);

    let stats = body(
        server
            .get("/api/v1/admin/stats", &server.admin_token)
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(
        stats["data"],
        json!({ "pending_approvals": 1, "active_projects": 1, "pending_invoices": 1 })
    );

    let res = server
        .patch(
            &format!("/api/v1/admin/projects/{project_id}"),
            &server.admin_token,
        )
        .json(&json!({ "status": "delivered" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let stats = body(
        server
            .get("/api/v1/admin/stats", &server.admin_token)
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(stats["data"]["active_projects"], 0);

    let res = server
        .get("/api/v1/admin/stats", &pending_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 403);
}
