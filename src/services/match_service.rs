// ==================== MATCH COORDINATOR ====================
// Máquina de estados das solicitações de match. As entries vivem embutidas
// no documento do receiver (match_requests); o match mútuo é o par de
// entradas simétricas em matched_users dos dois usuários.
//
// Regras de concorrência: toda mutação num documento é um único update_one
// atômico (push filtrado / $set posicional / $addToSet), nunca
// read-modify-write ingênuo. O accept toca dois documentos sem transação;
// o write do receiver é o sinal autoritativo e o do sender é repetido e,
// se ainda falhar, vira PartialFailure (retry do resolve é idempotente).

use crate::{
    database::MongoDB,
    models::{MatchRequest, MatchRequestStatus, User},
    utils::error::AppError,
};
use mongodb::bson::{doc, DateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchAction {
    Accept,
    Reject,
}

impl MatchAction {
    /// Parseia a action antes de qualquer I/O (fail fast, sem writes parciais)
    pub fn parse(action: &str) -> Result<Self, AppError> {
        match action {
            "accept" => Ok(MatchAction::Accept),
            "reject" => Ok(MatchAction::Reject),
            other => Err(AppError::InvalidArgument(format!(
                "Invalid action '{}'. Use 'accept' or 'reject'.",
                other
            ))),
        }
    }
}

/// Quais writes um resolve precisa aplicar, dado o status atual da entry.
/// Separado do I/O para a política de idempotência ficar testável.
#[derive(Debug, PartialEq, Eq)]
enum ResolutionPlan {
    /// Status -> accepted, $addToSet nos dois matched_users.
    /// Vale para pending, para re-accept (addToSet deduplica) e para
    /// sobrescrever um rejected.
    AcceptBothSides,
    /// Status -> rejected, só o documento do receiver muda.
    /// Vale para pending e para re-reject (no-op efetivo).
    RejectReceiverOnly,
    /// Sobrescrita accepted -> rejected: além do status, remove o par de
    /// matched_users dos dois lados para manter a simetria.
    RejectAndUnmatch,
}

/// `sender_has_match` cobre o unmatch interrompido: se o write do sender
/// falhou num reject anterior (PartialFailure), a entry já está rejected
/// mas o sender ainda carrega o receiver em matched_users; o retry precisa
/// refazer o $pull (idempotente) em vez de virar no-op.
fn plan_resolution(
    current: MatchRequestStatus,
    action: MatchAction,
    sender_has_match: bool,
) -> ResolutionPlan {
    match (action, current) {
        (MatchAction::Accept, _) => ResolutionPlan::AcceptBothSides,
        (MatchAction::Reject, MatchRequestStatus::Accepted) => ResolutionPlan::RejectAndUnmatch,
        (MatchAction::Reject, _) if sender_has_match => ResolutionPlan::RejectAndUnmatch,
        (MatchAction::Reject, _) => ResolutionPlan::RejectReceiverOnly,
    }
}

/// Validações puras do submit: par distinto e nenhuma entry anterior do
/// mesmo sender (qualquer status bloqueia).
fn validate_submit(
    sender_id: &str,
    receiver_id: &str,
    receiver: &User,
) -> Result<(), AppError> {
    if sender_id == receiver_id {
        return Err(AppError::InvalidArgument(
            "Cannot send a match request to yourself.".to_string(),
        ));
    }
    if receiver.request_from(sender_id).is_some() {
        return Err(AppError::Conflict(
            "Match request already sent.".to_string(),
        ));
    }
    Ok(())
}

/// Localiza a entry de sender_id no receiver, ou NotFound
fn locate_request<'a>(
    receiver: &'a User,
    sender_id: &str,
) -> Result<&'a MatchRequest, AppError> {
    receiver
        .request_from(sender_id)
        .ok_or_else(|| AppError::NotFound("Match request not found.".to_string()))
}

/// Envia uma solicitação de match de sender para receiver.
///
/// Só o documento do receiver é alterado. A checagem de duplicata e o
/// append são o mesmo update (push filtrado), então dois submits
/// concorrentes do mesmo sender não conseguem inserir duas entries.
pub async fn submit_request(
    db: &MongoDB,
    sender_id: &str,
    receiver_id: &str,
) -> Result<(), AppError> {
    log::info!("💌 Match request: {} -> {}", sender_id, receiver_id);

    // Self-request falha antes de qualquer I/O
    if sender_id == receiver_id {
        return Err(AppError::InvalidArgument(
            "Cannot send a match request to yourself.".to_string(),
        ));
    }

    let users = db.collection::<User>("users");

    let sender = users
        .find_one(doc! { "user_id": sender_id })
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
    if sender.is_none() {
        return Err(AppError::NotFound("Sender not found.".to_string()));
    }

    let receiver = users
        .find_one(doc! { "user_id": receiver_id })
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Receiver not found.".to_string()))?;

    validate_submit(sender_id, receiver_id, &receiver)?;

    let now = DateTime::now();
    let entry = MatchRequest {
        sender_id: sender_id.to_string(),
        status: MatchRequestStatus::Pending,
        created_at: Some(now.into()),
        resolved_at: None,
    };
    let entry_bson =
        mongodb::bson::to_bson(&entry).map_err(|e| AppError::DatabaseError(e.to_string()))?;

    // Push filtrado: só insere se ainda não existe entry desse sender
    let result = users
        .update_one(
            doc! {
                "user_id": receiver_id,
                "match_requests.sender_id": { "$ne": sender_id },
            },
            doc! {
                "$push": { "match_requests": entry_bson },
                "$set": { "updated_at": now },
            },
        )
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    if result.modified_count == 0 {
        // Outro submit do mesmo sender chegou entre o find_one e o update
        return Err(AppError::Conflict(
            "Match request already sent.".to_string(),
        ));
    }

    log::info!("✅ Match request recorded: {} -> {}", sender_id, receiver_id);
    Ok(())
}

/// Resolve (accept/reject) a solicitação de sender no documento do receiver.
/// Retorna o novo status da entry.
pub async fn resolve_request(
    db: &MongoDB,
    receiver_id: &str,
    sender_id: &str,
    action: MatchAction,
) -> Result<MatchRequestStatus, AppError> {
    log::info!(
        "🤝 Resolving match request {} -> {} ({:?})",
        sender_id,
        receiver_id,
        action
    );

    let users = db.collection::<User>("users");

    let receiver = users
        .find_one(doc! { "user_id": receiver_id })
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Receiver not found.".to_string()))?;

    let sender = users
        .find_one(doc! { "user_id": sender_id })
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Sender not found.".to_string()))?;

    let entry = locate_request(&receiver, sender_id)?;

    let now = DateTime::now();

    match plan_resolution(entry.status, action, sender.has_match(receiver_id)) {
        ResolutionPlan::AcceptBothSides => {
            // Lado do receiver: status + matched_users num único update atômico
            let result = users
                .update_one(
                    doc! { "user_id": receiver_id, "match_requests.sender_id": sender_id },
                    doc! {
                        "$set": {
                            "match_requests.$.status": "accepted",
                            "match_requests.$.resolved_at": now,
                            "updated_at": now,
                        },
                        "$addToSet": { "matched_users": sender_id },
                    },
                )
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

            if result.matched_count == 0 {
                // Entry sumiu entre o find_one e o update
                return Err(AppError::NotFound("Match request not found.".to_string()));
            }

            // Lado do sender: $addToSet deduplica, então o retry é seguro
            apply_sender_side(
                db,
                sender_id,
                doc! {
                    "$addToSet": { "matched_users": receiver_id },
                    "$set": { "updated_at": now },
                },
            )
            .await?;

            log::info!("✅ Match accepted: {} <-> {}", sender_id, receiver_id);
            Ok(MatchRequestStatus::Accepted)
        }
        ResolutionPlan::RejectReceiverOnly => {
            let result = users
                .update_one(
                    doc! { "user_id": receiver_id, "match_requests.sender_id": sender_id },
                    doc! {
                        "$set": {
                            "match_requests.$.status": "rejected",
                            "match_requests.$.resolved_at": now,
                            "updated_at": now,
                        },
                    },
                )
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

            if result.matched_count == 0 {
                // Entry sumiu entre o find_one e o update
                return Err(AppError::NotFound("Match request not found.".to_string()));
            }

            log::info!("✅ Match rejected: {} -> {}", sender_id, receiver_id);
            Ok(MatchRequestStatus::Rejected)
        }
        ResolutionPlan::RejectAndUnmatch => {
            let result = users
                .update_one(
                    doc! { "user_id": receiver_id, "match_requests.sender_id": sender_id },
                    doc! {
                        "$set": {
                            "match_requests.$.status": "rejected",
                            "match_requests.$.resolved_at": now,
                            "updated_at": now,
                        },
                        "$pull": { "matched_users": sender_id },
                    },
                )
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

            if result.matched_count == 0 {
                // Entry sumiu entre o find_one e o update
                return Err(AppError::NotFound("Match request not found.".to_string()));
            }

            apply_sender_side(
                db,
                sender_id,
                doc! {
                    "$pull": { "matched_users": receiver_id },
                    "$set": { "updated_at": now },
                },
            )
            .await?;

            log::info!("✅ Match rejected (unmatched): {} -> {}", sender_id, receiver_id);
            Ok(MatchRequestStatus::Rejected)
        }
    }
}

/// Segundo write do par receiver/sender. Uma tentativa de retry imediato;
/// se ainda falhar, PartialFailure - o lado do receiver já está persistido
/// e o caller deve repetir o resolve (os updates são idempotentes).
async fn apply_sender_side(
    db: &MongoDB,
    sender_id: &str,
    update: mongodb::bson::Document,
) -> Result<(), AppError> {
    let users = db.collection::<User>("users");
    let filter = doc! { "user_id": sender_id };

    match users.update_one(filter.clone(), update.clone()).await {
        Ok(_) => Ok(()),
        Err(first) => {
            log::warn!(
                "⚠️ Sender-side write failed for {}, retrying: {}",
                sender_id,
                first
            );
            users.update_one(filter, update).await.map(|_| ()).map_err(|e| {
                log::error!("❌ Sender-side write failed twice for {}: {}", sender_id, e);
                AppError::PartialFailure(format!(
                    "Receiver updated but sender record was not: {}",
                    e
                ))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(
        user_id: &str,
        matched_users: Vec<&str>,
        match_requests: Vec<(&str, MatchRequestStatus)>,
    ) -> User {
        User {
            _id: None,
            user_id: user_id.to_string(),
            email: format!("{}@example.com", user_id),
            password: None,
            firstname: None,
            lastname: None,
            birth_date: None,
            address: None,
            profile_pic: String::new(),
            about: String::new(),
            gallery: vec![],
            gender: None,
            interests: vec![],
            otp: None,
            otp_expires: None,
            is_verified: true,
            matched_users: matched_users.into_iter().map(String::from).collect(),
            match_requests: match_requests
                .into_iter()
                .map(|(sender_id, status)| MatchRequest {
                    sender_id: sender_id.to_string(),
                    status,
                    created_at: None,
                    resolved_at: None,
                })
                .collect(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn parse_accepts_known_actions() {
        assert_eq!(MatchAction::parse("accept").unwrap(), MatchAction::Accept);
        assert_eq!(MatchAction::parse("reject").unwrap(), MatchAction::Reject);
    }

    #[test]
    fn parse_rejects_unknown_action() {
        let err = MatchAction::parse("block").unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[test]
    fn self_request_is_invalid() {
        let receiver = user_with("u1", vec![], vec![]);
        let err = validate_submit("u1", "u1", &receiver).unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[test]
    fn first_request_passes_validation() {
        let receiver = user_with("u2", vec![], vec![]);
        assert!(validate_submit("u1", "u2", &receiver).is_ok());
    }

    #[test]
    fn duplicate_request_conflicts_regardless_of_status() {
        for status in [
            MatchRequestStatus::Pending,
            MatchRequestStatus::Accepted,
            MatchRequestStatus::Rejected,
        ] {
            let receiver = user_with("u2", vec![], vec![("u1", status)]);
            let err = validate_submit("u1", "u2", &receiver).unwrap_err();
            assert_eq!(err.kind(), "conflict");
        }
    }

    #[test]
    fn requests_from_other_senders_do_not_block() {
        let receiver = user_with("u2", vec![], vec![("u3", MatchRequestStatus::Pending)]);
        assert!(validate_submit("u1", "u2", &receiver).is_ok());
    }

    #[test]
    fn resolve_of_never_submitted_request_is_not_found() {
        let receiver = user_with("u2", vec![], vec![("u3", MatchRequestStatus::Pending)]);
        let err = locate_request(&receiver, "u1").unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn locate_finds_the_matching_entry() {
        let receiver = user_with("u2", vec![], vec![("u1", MatchRequestStatus::Accepted)]);
        let entry = locate_request(&receiver, "u1").unwrap();
        assert_eq!(entry.status, MatchRequestStatus::Accepted);
    }

    #[test]
    fn accept_plan_is_the_same_from_any_state() {
        // Re-accept e rejected->accepted seguem o mesmo caminho; o
        // $addToSet garante que não há duplicata em matched_users.
        for current in [
            MatchRequestStatus::Pending,
            MatchRequestStatus::Accepted,
            MatchRequestStatus::Rejected,
        ] {
            assert_eq!(
                plan_resolution(current, MatchAction::Accept, false),
                ResolutionPlan::AcceptBothSides
            );
            assert_eq!(
                plan_resolution(current, MatchAction::Accept, true),
                ResolutionPlan::AcceptBothSides
            );
        }
    }

    #[test]
    fn reject_of_pending_touches_receiver_only() {
        assert_eq!(
            plan_resolution(MatchRequestStatus::Pending, MatchAction::Reject, false),
            ResolutionPlan::RejectReceiverOnly
        );
    }

    #[test]
    fn reject_of_rejected_is_noop_on_sender() {
        assert_eq!(
            plan_resolution(MatchRequestStatus::Rejected, MatchAction::Reject, false),
            ResolutionPlan::RejectReceiverOnly
        );
    }

    #[test]
    fn reject_of_accepted_unmatches_both_sides() {
        assert_eq!(
            plan_resolution(MatchRequestStatus::Accepted, MatchAction::Reject, false),
            ResolutionPlan::RejectAndUnmatch
        );
    }

    #[test]
    fn reject_retry_repairs_interrupted_unmatch() {
        // Cenário: um reject anterior gravou o lado do receiver (entry já
        // rejected) mas o $pull do sender falhou e virou PartialFailure.
        // No retry o sender ainda carrega o match; o plano precisa voltar
        // ao caminho de unmatch em vez de tratar como re-reject no-op.
        let sender = user_with("u1", vec!["u2"], vec![]);
        assert!(sender.has_match("u2"));
        assert_eq!(
            plan_resolution(
                MatchRequestStatus::Rejected,
                MatchAction::Reject,
                sender.has_match("u2"),
            ),
            ResolutionPlan::RejectAndUnmatch
        );
        // Pending com resíduo de match também repara
        assert_eq!(
            plan_resolution(MatchRequestStatus::Pending, MatchAction::Reject, true),
            ResolutionPlan::RejectAndUnmatch
        );
    }
}
