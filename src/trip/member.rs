//! Member management: joins, deletions, contributions, reimbursements

use bigdecimal::BigDecimal;

use crate::reconciliation::recompute;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::validate_positive_amount;

/// Member manager handling the member lifecycle and money movements.
///
/// Every mutation follows the same cycle: load the trip snapshot, validate,
/// mutate one ledger fact, recompute derived balances, persist. Creating a
/// pending request skips the recompute step; pending entries are inert until
/// resolved.
pub struct MemberManager<S: TripStorage> {
    pub(crate) storage: S,
    validator: Box<dyn MemberValidator>,
}

impl<S: TripStorage> MemberManager<S> {
    /// Create a new member manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultMemberValidator),
        }
    }

    /// Create a new member manager with a custom validator
    pub fn with_validator(storage: S, validator: Box<dyn MemberValidator>) -> Self {
        Self { storage, validator }
    }

    async fn get_trip_required(&self, code: &str) -> TripResult<Trip> {
        self.storage
            .get_trip(code)
            .await?
            .ok_or_else(|| TripError::TripNotFound(code.to_string()))
    }

    /// Add a member directly (admin path)
    pub async fn add_member(&mut self, code: &str, pin: &str, name: String) -> TripResult<Member> {
        self.validator.validate_member_name(&name)?;

        let mut trip = self.get_trip_required(code).await?;
        trip.verify_pin(pin)?;

        let member = Member::new(name);
        trip.members.push(member.clone());
        recompute(&mut trip);
        self.storage.update_trip(&trip).await?;

        Ok(member)
    }

    /// File a join request; no derived field changes until approval
    pub async fn request_join(&mut self, code: &str, name: String) -> TripResult<JoinRequest> {
        self.validator.validate_member_name(&name)?;

        let mut trip = self.get_trip_required(code).await?;
        let request = JoinRequest::new(name);
        trip.join_requests.push(request.clone());
        self.storage.update_trip(&trip).await?;

        Ok(request)
    }

    /// Resolve a join request. Approval promotes it to a member and
    /// recomputes; rejection just consumes it.
    pub async fn approve_join(
        &mut self,
        code: &str,
        request_id: &str,
        action: RequestAction,
    ) -> TripResult<Option<Member>> {
        let mut trip = self.get_trip_required(code).await?;
        let index = trip
            .join_requests
            .iter()
            .position(|r| r.id == request_id)
            .ok_or_else(|| TripError::RequestNotFound(request_id.to_string()))?;
        let request = trip.join_requests.remove(index);

        let member = match action {
            RequestAction::Approve => {
                let member = Member::new(request.name);
                trip.members.push(member.clone());
                recompute(&mut trip);
                Some(member)
            }
            RequestAction::Reject => None,
        };

        self.storage.update_trip(&trip).await?;
        Ok(member)
    }

    /// Delete a member (admin path). The administrator (first member) is
    /// never deletable.
    pub async fn delete_member(&mut self, code: &str, pin: &str, member_id: &str) -> TripResult<()> {
        let mut trip = self.get_trip_required(code).await?;
        trip.verify_pin(pin)?;
        self.validator.validate_member_deletion(&trip, member_id)?;

        trip.members.retain(|m| m.id != member_id);
        recompute(&mut trip);
        self.storage.update_trip(&trip).await
    }

    /// File a deletion request for a member
    pub async fn request_member_deletion(
        &mut self,
        code: &str,
        member_id: &str,
    ) -> TripResult<DeletionRequest> {
        let mut trip = self.get_trip_required(code).await?;
        if trip.member(member_id).is_none() {
            return Err(TripError::MemberNotFound(member_id.to_string()));
        }

        let request = DeletionRequest::new(member_id.to_string());
        trip.deletion_requests.push(request.clone());
        self.storage.update_trip(&trip).await?;

        Ok(request)
    }

    /// Resolve a deletion request. An approved request targeting the
    /// administrator consumes the request but leaves the member list
    /// unchanged.
    pub async fn approve_member_deletion(
        &mut self,
        code: &str,
        request_id: &str,
        action: RequestAction,
    ) -> TripResult<()> {
        let mut trip = self.get_trip_required(code).await?;
        let index = trip
            .deletion_requests
            .iter()
            .position(|r| r.id == request_id)
            .ok_or_else(|| TripError::RequestNotFound(request_id.to_string()))?;
        let request = trip.deletion_requests.remove(index);

        if action == RequestAction::Approve && !trip.is_admin(&request.member_id) {
            trip.members.retain(|m| m.id != request.member_id);
            recompute(&mut trip);
        }

        self.storage.update_trip(&trip).await
    }

    /// Record a contribution payment toward the budget.
    ///
    /// The portion covering the member's remaining contribution goes to
    /// `actual_contribution`; any excess is routed into `personal` (money
    /// effectively fronted beyond their share, owed back).
    pub async fn record_contribution(
        &mut self,
        code: &str,
        member_id: &str,
        amount: BigDecimal,
    ) -> TripResult<()> {
        validate_positive_amount(&amount)?;

        let mut trip = self.get_trip_required(code).await?;
        let member = trip
            .member_mut(member_id)
            .ok_or_else(|| TripError::MemberNotFound(member_id.to_string()))?;
        apply_contribution(member, &amount);
        recompute(&mut trip);
        self.storage.update_trip(&trip).await
    }

    /// File a contribution request; the money is not counted until approval
    pub async fn request_contribution(
        &mut self,
        code: &str,
        member_id: &str,
        amount: BigDecimal,
    ) -> TripResult<ContributionRequest> {
        validate_positive_amount(&amount)?;

        let mut trip = self.get_trip_required(code).await?;
        if trip.member(member_id).is_none() {
            return Err(TripError::MemberNotFound(member_id.to_string()));
        }

        let request = ContributionRequest::new(member_id.to_string(), amount);
        trip.contribution_requests.push(request.clone());
        self.storage.update_trip(&trip).await?;

        Ok(request)
    }

    /// Resolve a contribution request. Approval applies the same overpayment
    /// routing as a directly recorded contribution.
    pub async fn approve_contribution(
        &mut self,
        code: &str,
        request_id: &str,
        action: RequestAction,
    ) -> TripResult<()> {
        let mut trip = self.get_trip_required(code).await?;
        let index = trip
            .contribution_requests
            .iter()
            .position(|r| r.id == request_id)
            .ok_or_else(|| TripError::RequestNotFound(request_id.to_string()))?;

        if action == RequestAction::Approve {
            let target = trip.contribution_requests[index].member_id.clone();
            if trip.member(&target).is_none() {
                // Member left between filing and approval; the request stays
                // pending for the admin to reject.
                return Err(TripError::MemberNotFound(target));
            }
            let request = trip.contribution_requests.remove(index);
            let member = trip
                .member_mut(&request.member_id)
                .ok_or_else(|| TripError::MemberNotFound(request.member_id.clone()))?;
            apply_contribution(member, &request.amount);
            recompute(&mut trip);
        } else {
            trip.contribution_requests.remove(index);
        }

        self.storage.update_trip(&trip).await
    }

    /// Pay a member back for personal spending
    pub async fn reimburse(
        &mut self,
        code: &str,
        member_id: &str,
        amount: BigDecimal,
    ) -> TripResult<()> {
        validate_positive_amount(&amount)?;

        let mut trip = self.get_trip_required(code).await?;
        let member = trip
            .member_mut(member_id)
            .ok_or_else(|| TripError::MemberNotFound(member_id.to_string()))?;
        member.reimbursed += &amount;
        member.touch();
        recompute(&mut trip);
        self.storage.update_trip(&trip).await
    }

    /// Return contributed money to a member; the paid-in figure never goes
    /// below zero
    pub async fn refund(
        &mut self,
        code: &str,
        member_id: &str,
        amount: BigDecimal,
    ) -> TripResult<()> {
        validate_positive_amount(&amount)?;

        let mut trip = self.get_trip_required(code).await?;
        let member = trip
            .member_mut(member_id)
            .ok_or_else(|| TripError::MemberNotFound(member_id.to_string()))?;
        member.actual_contribution = if member.actual_contribution > amount {
            &member.actual_contribution - &amount
        } else {
            BigDecimal::from(0)
        };
        member.touch();
        recompute(&mut trip);
        self.storage.update_trip(&trip).await
    }
}

/// Route a payment into the member's ledger fields: cover the remaining
/// contribution first, then treat any excess as personal credit. The personal
/// bucket is frozen afterwards so the engine's initialization pass does not
/// rebuild it away.
fn apply_contribution(member: &mut Member, amount: &BigDecimal) {
    if *amount > member.remaining_contribution {
        let excess = amount - &member.remaining_contribution;
        member.actual_contribution += &member.remaining_contribution;
        member.personal += &excess;
        member.custom_personal = true;
    } else {
        member.actual_contribution += amount;
    }
    member.touch();
}
