use alloy::sol;

sol! {
    /// MasterChef-style staking manager. Only the members the indexer
    /// decodes are declared.
    contract MiningManager {
        event Deposit(address indexed user, uint256 indexed pid, uint256 amount);
        event Withdraw(address indexed user, uint256 indexed pid, uint256 amount);
        event EmergencyWithdraw(address indexed user, uint256 indexed pid, uint256 amount);
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

        function poolLength() external view returns (uint256);
        function poolInfo(uint256 pid) external view returns (address lpToken, uint256 allocPoint, uint256 lastRewardBlock, uint256 accRewardPerShare);

        function add(uint256 allocPoint, address lpToken, bool withUpdate) external;
        function set(uint256 pid, uint256 allocPoint, bool withUpdate) external;
        function migrate(uint256 pid) external;
    }
}
