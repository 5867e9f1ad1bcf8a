use crate::error::AppError;
use crate::external::IdTokenVerifier;
use crate::models::{Action, LotteryRequest};
use crate::services::LotteryService;
use actix_web::http::Method;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

pub const ALLOW_ORIGIN: (&str, &str) = ("Access-Control-Allow-Origin", "*");

/// 预检请求: 空 body + 宽松的 CORS 头
fn preflight() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(ALLOW_ORIGIN)
        .insert_header(("Access-Control-Allow-Methods", "GET,POST,OPTIONS"))
        .insert_header(("Access-Control-Allow-Headers", "Content-Type"))
        .finish()
}

/// 单一入口:
/// 1. OPTIONS 直接返回预检响应
/// 2. POST 读取 JSON body, 其它方法读取 URL query
/// 3. 校验 LINE ID token, 取 sub 作为用户ID
/// 4. 按 act 分发
pub async fn lottery(
    req: HttpRequest,
    body: web::Bytes,
    verifier: web::Data<dyn IdTokenVerifier>,
    service: web::Data<LotteryService>,
) -> Result<HttpResponse, AppError> {
    if req.method() == Method::OPTIONS {
        return Ok(preflight());
    }

    let request = if req.method() == Method::POST {
        LotteryRequest::from_json_body(&body)?
    } else {
        LotteryRequest::from_query(req.query_string())?
    };

    let claims = verifier
        .verify(request.id_token.as_deref().unwrap_or_default())
        .await?;
    let user_id = claims.sub;

    let payload = match request.action()? {
        Action::Draw => {
            service.draw(&user_id).await?;
            json!({ "ok": true })
        }
        Action::Winner => {
            let prize = service
                .award(&user_id, request.name.clone(), request.phone.clone())
                .await?;
            json!({ "ok": true, "prize": prize })
        }
        Action::Query => {
            let records = service.records(&user_id).await?;
            json!({ "ok": true, "records": records })
        }
        Action::Redeem => {
            let record_id = request.record_id()?;
            service.redeem(&user_id, record_id).await?;
            json!({ "ok": true })
        }
    };

    Ok(HttpResponse::Ok().insert_header(ALLOW_ORIGIN).json(payload))
}

/// 路由配置
pub fn lottery_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::route().to(lottery))
        .route("/lottery", web::route().to(lottery));
}
