use mockito::{Matcher, Server, ServerGuard};
use resumatch::models::HistoryQuery;
use resumatch::{
    ApiClient, ClientError, CoverLetterId, MemoryStorage, Page, PageState, ResumeFile, ResumeId,
    SessionStore, UploadForm,
};
use serde_json::json;
use std::str::FromStr;

const TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.eyJpZCI6InUxIn0.sig";

fn client_for(server: &ServerGuard) -> ApiClient<MemoryStorage> {
    let session = SessionStore::new(MemoryStorage::new());
    ApiClient::new(&format!("{}/api/", server.url()), session).unwrap()
}

fn analysis_json(id: &str) -> serde_json::Value {
    json!({
        "resumeId": id,
        "fileName": "jane_doe.pdf",
        "uploadedAt": "2024-03-05T14:07:31.640Z",
        "jobRole": "Backend Engineer",
        "analysis": {
            "atsScore": 82,
            "suitabilityPercentage": 71,
            "mistakes": ["Summary is too long"],
            "improvements": ["Quantify impact"],
            "missingSkills": ["Kubernetes"],
            "keywords": ["Rust", "gRPC"]
        }
    })
}

fn pdf() -> ResumeFile {
    ResumeFile::new("jane_doe.pdf", "application/pdf", b"%PDF-1.7\n".to_vec())
}

async fn logged_in(server: &mut ServerGuard) -> ApiClient<MemoryStorage> {
    let login = server
        .mock("POST", "/api/auth/login")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({
            "email": "jane@example.com",
            "password": "hunter2"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "token": TOKEN,
                "user": {"name": "Jane Doe", "email": "jane@example.com"}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let mut client = client_for(server);
    client.login("jane@example.com", "hunter2").await.unwrap();
    login.assert_async().await;
    client
}

#[tokio::test]
async fn test_login_stores_issued_token() {
    let mut server = Server::new_async().await;
    let client = logged_in(&mut server).await;
    assert_eq!(client.session().get_token().as_deref(), Some(TOKEN));
    assert_eq!(client.current_user().unwrap().name, "Jane Doe");
}

#[tokio::test]
async fn test_rename_cached_user() {
    let mut server = Server::new_async().await;
    let mut client = logged_in(&mut server).await;
    let user = client.rename_cached_user("  Jane Q. Doe ").unwrap();
    assert_eq!(user.name, "Jane Q. Doe");
    assert_eq!(client.current_user().unwrap().name, "Jane Q. Doe");
    assert_eq!(client.session().get_token().as_deref(), Some(TOKEN));
    assert!(client.rename_cached_user(" ").is_err());

    client.logout().unwrap();
    assert!(matches!(
        client.rename_cached_user("Jane"),
        Err(ClientError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_login_failure_passes_message_through() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/auth/login")
        .with_status(401)
        .with_body(r#"{"status":"error","message":"Invalid email or password"}"#)
        .create_async()
        .await;
    let mut client = client_for(&server);
    let err = client
        .login("jane@example.com", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid email or password");
    assert_eq!(err.status(), Some(401));
    assert_eq!(client.session().get_token(), None);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_signup_stores_session() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/auth/signup")
        .match_body(Matcher::Json(json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "password": "hunter2"
        })))
        .with_status(201)
        .with_body(
            json!({
                "status": "success",
                "data": {
                    "token": "fresh-token",
                    "user": {"id": "u1", "name": "Jane Doe", "email": "jane@example.com"}
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let mut client = client_for(&server);
    let auth = client
        .signup(" Jane Doe ", "jane@example.com", "hunter2")
        .await
        .unwrap();
    assert_eq!(auth.user.id.as_deref(), Some("u1"));
    assert_eq!(client.session().get_token().as_deref(), Some("fresh-token"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let mut server = Server::new_async().await;
    let mut client = logged_in(&mut server).await;
    let mock = server
        .mock("GET", "/api/resumes/64f1c2a9e4b0a1b2c3d4e5f6")
        .match_header("authorization", format!("Bearer {TOKEN}").as_str())
        .with_status(200)
        .with_body(
            json!({"status": "success", "data": analysis_json("64f1c2a9e4b0a1b2c3d4e5f6")})
                .to_string(),
        )
        .create_async()
        .await;
    let id = ResumeId::from_str("64f1c2a9e4b0a1b2c3d4e5f6").unwrap();
    let result = client.get_resume_analysis(&id).await.unwrap();
    assert_eq!(result.analysis.ats_score.value(), 82);
    assert_eq!(result.analysis.missing_skills, vec!["Kubernetes".to_string()]);
    mock.assert_async().await;

    // after logout, the same call goes out without credentials
    client.logout().unwrap();
    client.logout().unwrap();
    assert_eq!(client.session().get_token(), None);
    assert_eq!(client.current_user(), None);
    let anon = server
        .mock("GET", "/api/resumes/64f1c2a9e4b0a1b2c3d4e5f6")
        .match_header("authorization", Matcher::Missing)
        .with_status(401)
        .with_body(r#"{"message":"Not authorized, no token"}"#)
        .expect(1)
        .create_async()
        .await;
    let err = client.get_resume_analysis(&id).await.unwrap_err();
    assert_eq!(err.to_string(), "Not authorized, no token");
    anon.assert_async().await;
}

#[tokio::test]
async fn test_unknown_resume_message() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/resumes/unknown-id")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"error","message":"Resume not found"}"#)
        .create_async()
        .await;
    let client = client_for(&server);
    let err = client
        .get_resume_analysis(&ResumeId::from_str("unknown-id").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Resume not found");
    assert!(err.is_not_found());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_cover_letter_fallback() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/cover-letters/nope")
        .with_status(404)
        .with_header("content-type", "text/html")
        .with_body("<h1>Not Found</h1>")
        .create_async()
        .await;
    let client = client_for(&server);
    let err = client
        .get_cover_letter(&CoverLetterId::from_str("nope").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Cover letter not found");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_success_flag_is_checked() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/resumes/r1")
        .with_status(200)
        .with_body(r#"{"status":"fail"}"#)
        .create_async()
        .await;
    let client = client_for(&server);
    let err = client
        .get_resume_analysis(&ResumeId::from_str("r1").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch resume analysis");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_malformed_success_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/resumes/r1")
        .with_status(200)
        .with_body(r#"{"status":"success","data":{"resumeId":"r1"}}"#)
        .create_async()
        .await;
    let client = client_for(&server);
    let err = client
        .get_resume_analysis(&ResumeId::from_str("r1").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MalformedResponse(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_transport_failure() {
    // nothing listens on port 1
    let session = SessionStore::new(MemoryStorage::new());
    let client = ApiClient::new("http://127.0.0.1:1/api", session).unwrap();
    let err = client
        .get_resume_analysis(&ResumeId::from_str("r1").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.to_string(), "Request failed");
}

#[tokio::test]
async fn test_upload_single_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/resumes/upload")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="resume"; filename="jane_doe.pdf""#.to_string()),
            Matcher::Regex(r#"name="jobDescription""#.to_string()),
            Matcher::Regex("Senior Rust engineer".to_string()),
        ]))
        .with_status(201)
        .with_body(json!({"status": "success", "data": analysis_json("new-resume-1")}).to_string())
        .expect(1)
        .create_async()
        .await;
    let client = client_for(&server);

    let mut form = UploadForm::new();
    form.select_file(pdf()).unwrap();
    form.set_job_description("Senior Rust engineer");
    let id = form.submit(&client).await.unwrap();
    assert_eq!(id.as_str(), "new-resume-1");
    assert!(!form.is_submitting());
    assert_eq!(form.error(), None);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_short_acknowledgement() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/resumes/upload")
        .with_status(201)
        .with_body(json!({"status": "success", "data": {"resumeId": "r9"}}).to_string())
        .expect(2)
        .create_async()
        .await;
    let client = client_for(&server);

    let mut form = UploadForm::new();
    form.select_file(pdf()).unwrap();
    form.set_job_description("Data engineer");
    let id = form.submit(&client).await.unwrap();
    assert_eq!(id.as_str(), "r9");
    assert_eq!(form.error(), None);

    let receipt = client.upload_resume(&pdf(), "Data engineer").await.unwrap();
    assert_eq!(receipt.resume_id, "r9");
    assert!(receipt.analysis.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_blocked_while_in_flight() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/resumes/upload")
        .with_status(201)
        .with_body(json!({"status": "success", "data": analysis_json("r-2")}).to_string())
        .expect(1)
        .create_async()
        .await;
    let client = client_for(&server);

    let mut form = UploadForm::new();
    form.select_file(pdf()).unwrap();
    form.set_job_description("Data engineer");
    let submission = form.begin_submit().unwrap();
    // second click while the first is still out
    assert!(form.submit(&client).await.is_err());
    let outcome = client
        .upload_resume(&submission.file, &submission.job_description)
        .await;
    assert_eq!(form.finish(outcome).unwrap().as_str(), "r-2");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_rejected_client_side() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/resumes/upload")
        .expect(0)
        .create_async()
        .await;
    let client = client_for(&server);

    let mut form = UploadForm::new();
    form.select_file(pdf()).unwrap();
    form.set_job_description("");
    let err = form.submit(&client).await.unwrap_err();
    assert_eq!(err.to_string(), "Please enter a job description");
    assert_eq!(form.error(), Some("Please enter a job description"));

    let docx = ResumeFile::new("cv.docx", "application/msword", vec![0xd0, 0xcf]);
    let err = client
        .upload_resume(&docx, "Data engineer")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Please upload a PDF file");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_failure_returns_to_form() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/resumes/upload")
        .with_status(400)
        .with_body(r#"{"status":"error","message":"Could not extract text from PDF"}"#)
        .create_async()
        .await;
    let client = client_for(&server);
    let mut form = UploadForm::new();
    form.select_file(pdf()).unwrap();
    form.set_job_description("Data engineer");
    assert!(form.submit(&client).await.is_err());
    assert_eq!(form.error(), Some("Could not extract text from PDF"));
    assert!(!form.is_submitting());
    mock.assert_async().await;
}

fn history_rows(n: usize) -> Vec<serde_json::Value> {
    (0..n)
        .map(|i| {
            // mongoose-style rows carry the id twice
            json!({
                "_id": format!("r{i}"),
                "id": format!("r{i}"),
                "fileName": format!("cv-{i}.pdf"),
                "uploadedAt": "2024-03-05T14:07:31Z",
                "analysis": {"atsScore": 60 + i, "keywords": ["Rust"]}
            })
        })
        .collect()
}

#[tokio::test]
async fn test_history_pagination() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/resumes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
            Matcher::UrlEncoded("sortBy".into(), "score".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "status": "success",
                "data": {
                    "resumes": history_rows(3),
                    "pagination": {"currentPage": 2, "totalPages": 2, "totalResumes": 13}
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let client = client_for(&server);
    let query = HistoryQuery {
        sort_by: Some(resumatch::models::SortBy::Score),
        ..HistoryQuery::page(2, 10)
    };
    let page = client.get_all_resumes(&query).await.unwrap();
    assert_eq!(page.resumes.len(), 3);
    assert_eq!(page.pagination.total_pages, 2);
    assert_eq!(page.resumes[2].ats_score().value(), 62);
    assert_eq!(page.resumes[1].resume_id().unwrap().as_str(), "r1");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_history_overfull_page_rejected() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/resumes")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({
                "status": "success",
                "data": {
                    "resumes": history_rows(6),
                    "pagination": {"totalPages": 2, "totalResumes": 6}
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let client = client_for(&server);
    let err = client
        .get_all_resumes(&HistoryQuery::page(1, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MalformedResponse(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cover_letter_generate_and_fetch() {
    let mut server = Server::new_async().await;
    let letter = json!({
        "coverLetterId": "cl-9",
        "companyName": "Acme",
        "jobRole": "Backend Engineer",
        "tone": "friendly",
        "length": "short",
        "generatedAt": "2024-03-05T15:00:00Z",
        "coverLetterContent": "Dear Acme team, ...",
        "keywords": ["Rust"]
    });
    let generate = server
        .mock("POST", "/api/cover-letters/generate/r1")
        .match_body(Matcher::Json(json!({"tone": "friendly", "length": "short"})))
        .with_status(201)
        .with_body(json!({"status": "success", "data": letter}).to_string())
        .create_async()
        .await;
    let fetch = server
        .mock("GET", "/api/cover-letters/cl-9")
        .with_status(200)
        .with_body(json!({"status": "success", "data": letter}).to_string())
        .create_async()
        .await;
    let client = client_for(&server);
    let created = client
        .generate_cover_letter(&ResumeId::from_str("r1").unwrap(), "friendly", "short")
        .await
        .unwrap();
    let fetched = client.get_cover_letter(&created.id().unwrap()).await.unwrap();
    assert_eq!(created, fetched);
    assert_eq!(fetched.company_name.as_deref(), Some("Acme"));
    generate.assert_async().await;
    fetch.assert_async().await;
}

#[tokio::test]
async fn test_deletes() {
    let mut server = Server::new_async().await;
    let resume = server
        .mock("DELETE", "/api/resumes/r1")
        .with_status(200)
        .with_body(r#"{"status":"success","message":"Resume deleted successfully"}"#)
        .create_async()
        .await;
    let letter = server
        .mock("DELETE", "/api/cover-letters/cl-1")
        .with_status(204)
        .create_async()
        .await;
    let client = client_for(&server);
    let msg = client
        .delete_resume(&ResumeId::from_str("r1").unwrap())
        .await
        .unwrap();
    assert_eq!(msg.as_deref(), Some("Resume deleted successfully"));
    let msg = client
        .delete_cover_letter(&CoverLetterId::from_str("cl-1").unwrap())
        .await
        .unwrap();
    assert_eq!(msg, None);
    resume.assert_async().await;
    letter.assert_async().await;
}

#[tokio::test]
async fn test_page_state_over_client() {
    let mut server = Server::new_async().await;
    let _ok = server
        .mock("GET", "/api/resumes/r1")
        .with_status(200)
        .with_body(json!({"status": "success", "data": analysis_json("r1")}).to_string())
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/api/resumes/r404")
        .with_status(404)
        .with_body(r#"{"message":"Resume not found"}"#)
        .create_async()
        .await;
    let client = client_for(&server);
    let client = &client;
    let mut page = Page::new();

    let state = page
        .load(ResumeId::from_str("r1").unwrap(), |id| async move {
            client.get_resume_analysis(&id).await
        })
        .await;
    assert_eq!(state.ready().unwrap().file_name, "jane_doe.pdf");

    let state = page
        .load(ResumeId::from_str("r404").unwrap(), |id| async move {
            client.get_resume_analysis(&id).await
        })
        .await;
    assert_eq!(state, &PageState::Error("Resume not found".to_string()));
}
