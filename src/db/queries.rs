use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Account, RequestType, Role, Ticket, TicketStatus, TimeSlot};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

const TICKET_COLUMNS: &str = "id, name, email, mobile_no, event_description, date, request_type, club_name, \
     start_minute, end_minute, status, approved_by, file_url, created_at, updated_at";

// ── Tickets ──

pub fn create_ticket(conn: &Connection, ticket: &Ticket) -> anyhow::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO tickets ({TICKET_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        params![
            ticket.id,
            ticket.name,
            ticket.email,
            ticket.mobile_no,
            ticket.event_description,
            ticket.date.format(DATE_FORMAT).to_string(),
            ticket.request_type.as_str(),
            ticket.club_name,
            ticket.start_minute,
            ticket.end_minute,
            ticket.status.as_str(),
            ticket.approved_by.map(|r| r.as_str()),
            ticket.file_url,
            ticket.created_at.format(TIMESTAMP_FORMAT).to_string(),
            ticket.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_ticket_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Ticket>> {
    let result = conn.query_row(
        &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = ?1"),
        params![id],
        |row| Ok(parse_ticket_row(row)),
    );

    match result {
        Ok(ticket) => Ok(Some(ticket?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_tickets(
    conn: &Connection,
    status: Option<TicketStatus>,
    date: Option<NaiveDate>,
) -> anyhow::Result<Vec<Ticket>> {
    let mut clauses = vec![];
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(status) = status {
        params_vec.push(Box::new(status.as_str()));
        clauses.push(format!("status = ?{}", params_vec.len()));
    }
    if let Some(date) = date {
        params_vec.push(Box::new(date.format(DATE_FORMAT).to_string()));
        clauses.push(format!("date = ?{}", params_vec.len()));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT {TICKET_COLUMNS} FROM tickets {where_clause} ORDER BY date ASC, start_minute ASC, created_at ASC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_ticket_row(row)))?;

    let mut tickets = vec![];
    for row in rows {
        tickets.push(row??);
    }
    Ok(tickets)
}

/// Intervals held by `booked` tickets on `date`, optionally ignoring one ticket.
pub fn booked_slots_for_date(
    conn: &Connection,
    date: NaiveDate,
    exclude_id: Option<&str>,
) -> anyhow::Result<Vec<TimeSlot>> {
    let mut stmt = conn.prepare(
        "SELECT start_minute, end_minute FROM tickets
         WHERE date = ?1 AND status = 'booked' AND id != ?2
         ORDER BY start_minute ASC",
    )?;

    let rows = stmt.query_map(
        params![date.format(DATE_FORMAT).to_string(), exclude_id.unwrap_or("")],
        |row| Ok(TimeSlot::new(row.get(0)?, row.get(1)?)),
    )?;

    let mut slots = vec![];
    for row in rows {
        slots.push(row?);
    }
    Ok(slots)
}

pub fn update_ticket_status(
    conn: &Connection,
    id: &str,
    status: TicketStatus,
    approved_by: Role,
) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string();
    let count = conn.execute(
        "UPDATE tickets SET status = ?1, approved_by = ?2, updated_at = ?3 WHERE id = ?4",
        params![status.as_str(), approved_by.as_str(), now, id],
    )?;
    Ok(count > 0)
}

fn parse_ticket_row(row: &rusqlite::Row) -> anyhow::Result<Ticket> {
    let date_str: String = row.get(5)?;
    let request_type_str: String = row.get(6)?;
    let status_str: String = row.get(10)?;
    let approved_by_str: Option<String> = row.get(11)?;
    let created_at_str: String = row.get(13)?;
    let updated_at_str: String = row.get(14)?;

    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)?;
    let request_type = RequestType::parse(&request_type_str)
        .ok_or_else(|| anyhow::anyhow!("unknown request type in row: {request_type_str}"))?;
    let status = TicketStatus::parse(&status_str)
        .ok_or_else(|| anyhow::anyhow!("unknown ticket status in row: {status_str}"))?;
    let approved_by = approved_by_str.as_deref().and_then(Role::parse);

    let created_at = NaiveDateTime::parse_from_str(&created_at_str, TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at = NaiveDateTime::parse_from_str(&updated_at_str, TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(Ticket {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        mobile_no: row.get(3)?,
        event_description: row.get(4)?,
        date,
        request_type,
        club_name: row.get(7)?,
        start_minute: row.get(8)?,
        end_minute: row.get(9)?,
        status,
        approved_by,
        file_url: row.get(12)?,
        created_at,
        updated_at,
    })
}

// ── Accounts ──

/// Returns false when an account with this email already exists.
pub fn create_account(conn: &Connection, account: &Account) -> anyhow::Result<bool> {
    let count = conn.execute(
        "INSERT OR IGNORE INTO accounts (email, username, password_hash, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            account.email,
            account.username,
            account.password_hash,
            account.role.as_str(),
            account.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(count > 0)
}

pub fn get_account(conn: &Connection, email: &str) -> anyhow::Result<Option<Account>> {
    let result = conn.query_row(
        "SELECT email, username, password_hash, role, created_at FROM accounts WHERE email = ?1",
        params![email],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        },
    );

    match result {
        Ok((email, username, password_hash, role_str, created_at_str)) => {
            let role = Role::parse(&role_str)
                .ok_or_else(|| anyhow::anyhow!("unknown role in row: {role_str}"))?;
            let created_at = NaiveDateTime::parse_from_str(&created_at_str, TIMESTAMP_FORMAT)
                .unwrap_or_else(|_| Utc::now().naive_utc());
            Ok(Some(Account {
                email,
                username,
                password_hash,
                role,
                created_at,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn ticket(id: &str, date: &str, start: u32, end: u32, status: TicketStatus) -> Ticket {
        let now = Utc::now().naive_utc();
        Ticket {
            id: id.to_string(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            mobile_no: "9876543210".to_string(),
            event_description: "robotics demo".to_string(),
            date: NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap(),
            request_type: RequestType::Club,
            club_name: Some("Robotics".to_string()),
            start_minute: start,
            end_minute: end,
            status,
            approved_by: None,
            file_url: "https://files.example.com/a.pdf".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_create_and_get_ticket() {
        let conn = db::init_db(":memory:").unwrap();
        create_ticket(&conn, &ticket("t-1", "2025-03-10", 540, 600, TicketStatus::Pending)).unwrap();

        let loaded = get_ticket_by_id(&conn, "t-1").unwrap().unwrap();
        assert_eq!(loaded.club_name.as_deref(), Some("Robotics"));
        assert_eq!(loaded.slot(), TimeSlot::new(540, 600));
        assert_eq!(loaded.status, TicketStatus::Pending);
        assert!(loaded.approved_by.is_none());

        assert!(get_ticket_by_id(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_list_tickets_filters() {
        let conn = db::init_db(":memory:").unwrap();
        create_ticket(&conn, &ticket("a", "2025-03-10", 600, 660, TicketStatus::Booked)).unwrap();
        create_ticket(&conn, &ticket("b", "2025-03-10", 540, 600, TicketStatus::Pending)).unwrap();
        create_ticket(&conn, &ticket("c", "2025-03-11", 540, 600, TicketStatus::Booked)).unwrap();

        assert_eq!(list_tickets(&conn, None, None).unwrap().len(), 3);

        let booked = list_tickets(&conn, Some(TicketStatus::Booked), None).unwrap();
        assert_eq!(booked.len(), 2);

        let day = NaiveDate::from_ymd_opt(2025, 3, 10);
        let on_day = list_tickets(&conn, None, day).unwrap();
        let ids: Vec<&str> = on_day.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let both = list_tickets(&conn, Some(TicketStatus::Booked), day).unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].id, "a");
    }

    #[test]
    fn test_booked_slots_for_date() {
        let conn = db::init_db(":memory:").unwrap();
        create_ticket(&conn, &ticket("a", "2025-03-10", 600, 660, TicketStatus::Booked)).unwrap();
        create_ticket(&conn, &ticket("b", "2025-03-10", 540, 600, TicketStatus::Booked)).unwrap();
        create_ticket(&conn, &ticket("c", "2025-03-10", 700, 800, TicketStatus::Pending)).unwrap();
        create_ticket(&conn, &ticket("d", "2025-03-11", 0, 60, TicketStatus::Booked)).unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let slots = booked_slots_for_date(&conn, date, None).unwrap();
        assert_eq!(slots, vec![TimeSlot::new(540, 600), TimeSlot::new(600, 660)]);

        let without_a = booked_slots_for_date(&conn, date, Some("a")).unwrap();
        assert_eq!(without_a, vec![TimeSlot::new(540, 600)]);
    }

    #[test]
    fn test_update_ticket_status() {
        let conn = db::init_db(":memory:").unwrap();
        create_ticket(&conn, &ticket("t-1", "2025-03-10", 540, 600, TicketStatus::Pending)).unwrap();

        assert!(update_ticket_status(&conn, "t-1", TicketStatus::Booked, Role::SuperAdmin).unwrap());
        let loaded = get_ticket_by_id(&conn, "t-1").unwrap().unwrap();
        assert_eq!(loaded.status, TicketStatus::Booked);
        assert_eq!(loaded.approved_by, Some(Role::SuperAdmin));

        assert!(!update_ticket_status(&conn, "nope", TicketStatus::Booked, Role::SuperAdmin).unwrap());
    }

    #[test]
    fn test_accounts() {
        let conn = db::init_db(":memory:").unwrap();
        let account = Account {
            email: "boss@example.com".to_string(),
            username: "boss".to_string(),
            password_hash: "v1$salt$hash".to_string(),
            role: Role::SuperAdmin,
            created_at: Utc::now().naive_utc(),
        };

        assert!(create_account(&conn, &account).unwrap());
        assert!(!create_account(&conn, &account).unwrap());

        let loaded = get_account(&conn, "boss@example.com").unwrap().unwrap();
        assert_eq!(loaded.username, "boss");
        assert_eq!(loaded.role, Role::SuperAdmin);
        assert!(get_account(&conn, "other@example.com").unwrap().is_none());
    }
}
