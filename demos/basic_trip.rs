//! Basic trip ledger usage example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tripledger_core::utils::MemoryTripStore;
use tripledger_core::{ExpenseCategory, NewExpense, NewTrip, Payer, RequestAction, TripService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧳 Tripledger Core - Basic Trip Example\n");

    // Create a trip service with in-memory storage
    let storage = MemoryTripStore::new();
    let mut service = TripService::new(storage);

    // 1. Create a trip; the creator becomes the administrator
    println!("🗺️  Creating Trip...");
    let trip = service
        .create_trip(NewTrip {
            name: "Goa trip".to_string(),
            budget: BigDecimal::from(30000),
            target_member_count: 3,
            date: NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
            admin_pin: "4321".to_string(),
            admin_name: "Asha".to_string(),
        })
        .await?;
    let code = trip.code.clone();
    println!("  ✓ Created trip '{}' with join code {}\n", trip.name, code);

    // 2. A friend joins via the code, another is added by the admin
    println!("👥 Adding Members...");
    let request = service.request_join(&code, "Bilal".to_string()).await?;
    let bilal = service
        .approve_join(&code, &request.id, RequestAction::Approve)
        .await?
        .expect("approved join returns the new member");
    println!("  ✓ Approved join request for Bilal");

    let chitra = service.add_member(&code, "4321", "Chitra".to_string()).await?;
    println!("  ✓ Admin added Chitra\n");

    // 3. Everyone contributes toward the budget
    println!("💰 Recording Contributions...");
    let trip = service.get_trip(&code).await?;
    let asha_id = trip.members[0].id.clone();
    for id in [&asha_id, &bilal.id, &chitra.id] {
        service
            .record_contribution(&code, id, BigDecimal::from(10000))
            .await?;
        println!("  ✓ Recorded contribution of ₹10,000");
    }
    println!();

    // 4. Bilal fronts a shared dinner
    println!("🍽️  Logging an Expense...");
    service
        .add_expense(
            &code,
            NewExpense {
                title: "Beach shack dinner".to_string(),
                amount: BigDecimal::from(2400),
                category: ExpenseCategory::Food,
                payer: Payer::Member(bilal.id.clone()),
                split_between: Some(vec![asha_id.clone(), bilal.id.clone(), chitra.id.clone()]),
                description: None,
            },
        )
        .await?;
    println!("  ✓ Logged ₹2,400 dinner paid by Bilal, split three ways\n");

    // 5. Show the reconciled balances
    println!("📊 Balances:");
    let trip = service.get_trip(&code).await?;
    for member in &trip.members {
        println!(
            "  {} — paid in: {}, personal: {}, owes share: {}, balance: {}",
            member.name,
            member.actual_contribution,
            member.personal,
            member.expense_share,
            member.balance
        );
    }

    Ok(())
}
